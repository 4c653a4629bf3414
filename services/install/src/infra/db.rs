use anyhow::Context as _;
use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder,
    sea_query::{Expr, OnConflict},
};
use uuid::Uuid;

use clinpush_install_schema::{install_codes, profiles};

use crate::domain::repository::{InstallCodeRepository, ProfileRepository};
use crate::domain::types::{InstallCode, InstallMetadata, Profile, REDEEM_GRACE_DAYS, RedemptionEvent};
use crate::error::InstallServiceError;

// ── InstallCode repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbInstallCodeRepository {
    pub db: DatabaseConnection,
}

impl InstallCodeRepository for DbInstallCodeRepository {
    async fn find_latest(
        &self,
        user_id: Uuid,
        email: &str,
    ) -> Result<Option<InstallCode>, InstallServiceError> {
        let model = install_codes::Entity::find()
            .filter(install_codes::Column::UserId.eq(user_id))
            .filter(install_codes::Column::Email.eq(email))
            .order_by_desc(install_codes::Column::CreatedAt)
            .one(&self.db)
            .await
            .context("find latest install code")?;
        model.map(install_code_from_model).transpose()
    }

    async fn find_by_code(&self, code: Uuid) -> Result<Option<InstallCode>, InstallServiceError> {
        let model = install_codes::Entity::find_by_id(code)
            .one(&self.db)
            .await
            .context("find install code")?;
        model.map(install_code_from_model).transpose()
    }

    async fn insert(&self, code: &InstallCode) -> Result<(), InstallServiceError> {
        install_codes::ActiveModel {
            code: Set(code.code),
            user_id: Set(code.user_id),
            email: Set(code.email.clone()),
            metadata: Set(serde_json::to_value(&code.metadata).context("serialize metadata")?),
            use_count: Set(code.use_count),
            max_uses: Set(code.max_uses),
            used_at: Set(code.used_at),
            last_used_at: Set(code.last_used_at),
            devices_info: Set(
                serde_json::to_value(&code.devices_info).context("serialize devices info")?
            ),
            expires_at: Set(code.expires_at),
            created_at: Set(code.created_at),
        }
        .insert(&self.db)
        .await
        .context("insert install code")?;
        Ok(())
    }

    async fn update_metadata(
        &self,
        code: Uuid,
        metadata: &InstallMetadata,
    ) -> Result<(), InstallServiceError> {
        install_codes::ActiveModel {
            code: Set(code),
            metadata: Set(serde_json::to_value(metadata).context("serialize metadata")?),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("update install code metadata")?;
        Ok(())
    }

    async fn increment_use(&self, code: Uuid) -> Result<Option<InstallCode>, InstallServiceError> {
        let now = Utc::now();
        let grace_cutoff = now - Duration::days(REDEEM_GRACE_DAYS);
        // Single conditional UPDATE: the cap/grace rule is checked in the same
        // statement that increments, so concurrent redeemers cannot under-count.
        let result = install_codes::Entity::update_many()
            .col_expr(
                install_codes::Column::UseCount,
                Expr::col(install_codes::Column::UseCount).add(1),
            )
            .col_expr(install_codes::Column::UsedAt, Expr::value(now))
            .col_expr(install_codes::Column::LastUsedAt, Expr::value(now))
            .filter(install_codes::Column::Code.eq(code))
            .filter(
                Condition::any()
                    .add(
                        Expr::col(install_codes::Column::UseCount)
                            .lt(Expr::col(install_codes::Column::MaxUses)),
                    )
                    .add(install_codes::Column::LastUsedAt.gt(grace_cutoff)),
            )
            .exec(&self.db)
            .await
            .context("increment install code use count")?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.find_by_code(code).await
    }

    async fn append_device_info(
        &self,
        code: Uuid,
        event: &RedemptionEvent,
    ) -> Result<(), InstallServiceError> {
        let model = install_codes::Entity::find_by_id(code)
            .one(&self.db)
            .await
            .context("load install code for telemetry")?;
        let Some(model) = model else {
            return Ok(());
        };
        let mut events: Vec<RedemptionEvent> =
            serde_json::from_value(model.devices_info).unwrap_or_default();
        events.push(event.clone());
        install_codes::ActiveModel {
            code: Set(code),
            devices_info: Set(serde_json::to_value(&events).context("serialize devices info")?),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("append redemption event")?;
        Ok(())
    }
}

fn install_code_from_model(
    model: install_codes::Model,
) -> Result<InstallCode, InstallServiceError> {
    let metadata: InstallMetadata =
        serde_json::from_value(model.metadata).context("decode install code metadata")?;
    // Telemetry is best-effort on the way in too; a malformed log must not
    // block redemption.
    let devices_info: Vec<RedemptionEvent> =
        serde_json::from_value(model.devices_info).unwrap_or_default();
    Ok(InstallCode {
        code: model.code,
        user_id: model.user_id,
        email: model.email,
        metadata,
        use_count: model.use_count,
        max_uses: model.max_uses,
        used_at: model.used_at,
        last_used_at: model.last_used_at,
        devices_info,
        expires_at: model.expires_at,
        created_at: model.created_at,
    })
}

// ── Profile repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbProfileRepository {
    pub db: DatabaseConnection,
}

impl ProfileRepository for DbProfileRepository {
    async fn upsert(&self, profile: &Profile) -> Result<(), InstallServiceError> {
        let active = profiles::ActiveModel {
            user_id: Set(profile.user_id),
            email: Set(profile.email.clone()),
            name: Set(profile.name.clone()),
            wh_id: Set(profile.wh_id.clone()),
            inst: Set(profile.inst.clone()),
            updated_at: Set(profile.updated_at),
        };
        profiles::Entity::insert(active)
            .on_conflict(
                OnConflict::column(profiles::Column::UserId)
                    .update_columns([
                        profiles::Column::Email,
                        profiles::Column::Name,
                        profiles::Column::WhId,
                        profiles::Column::Inst,
                        profiles::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .context("upsert profile")?;
        Ok(())
    }
}
