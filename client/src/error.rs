/// Client-side setup failures. Messages are rendered to the user verbatim;
/// every one leaves the shell with a retry affordance.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SetupError {
    #[error("Parâmetro \"email\" é obrigatório para preparar a instalação.")]
    MissingEmail,
    #[error("{0}")]
    Api(String),
    #[error("Não foi possível validar seu acesso: {0}")]
    Identity(String),
    #[error("A sessão não ficou disponível a tempo. Tente novamente.")]
    SessionTimeout,
    #[error("Instalado, mas sem código de ativação. Abra novamente o link de configuração para concluir.")]
    NoStoredCode,
    #[error(
        "Não encontramos seu código de ativação. Abra o link original no navegador (fora do app instalado) para gerar um novo acesso."
    )]
    RecoveryExhausted,
}
