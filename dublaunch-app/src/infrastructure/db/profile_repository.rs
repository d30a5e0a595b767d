use super::entities::{profile, Profile as ProfileEntity};
use super::{contains_any, map_db_err};
use crate::application::ports::ProfileStore;
use crate::domain::Profile;
use async_trait::async_trait;
use dublaunch_errors::AppError;
use sea_orm::{entity::*, query::*, DatabaseConnection};
use uuid::Uuid;

#[derive(Clone)]
pub struct ProfileRepository {
    db: DatabaseConnection,
}

fn to_domain(m: profile::Model) -> Profile {
    Profile {
        id: m.id,
        provider_subject: m.provider_subject,
        email: m.email,
        username: m.username,
        display_name: m.display_name,
        avatar_url: m.avatar_url,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

impl ProfileRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProfileStore for ProfileRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>, AppError> {
        let model = ProfileEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(model.map(to_domain))
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Profile>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = ProfileEntity::find()
            .filter(profile::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(models.into_iter().map(to_domain).collect())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Profile>, AppError> {
        let model = ProfileEntity::find()
            .filter(profile::Column::Username.eq(username.to_lowercase()))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(model.map(to_domain))
    }

    async fn search(&self, term: &str, limit: u64) -> Result<Vec<Profile>, AppError> {
        let models = ProfileEntity::find()
            .filter(contains_any(
                &[profile::Column::Username, profile::Column::DisplayName],
                term,
            ))
            .order_by_asc(profile::Column::Username)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(models.into_iter().map(to_domain).collect())
    }

    async fn upsert(&self, profile_data: &Profile) -> Result<Profile, AppError> {
        let existing = ProfileEntity::find()
            .filter(profile::Column::ProviderSubject.eq(profile_data.provider_subject.as_str()))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        let saved = if let Some(existing) = existing {
            let mut active: profile::ActiveModel = existing.into();
            active.email = Set(profile_data.email.clone());
            active.display_name = Set(profile_data.display_name.clone());
            active.avatar_url = Set(profile_data.avatar_url.clone());
            active.updated_at = Set(Some(chrono::Utc::now()));
            active.update(&self.db).await
        } else {
            let active = profile::ActiveModel {
                id: Set(profile_data.id),
                provider_subject: Set(profile_data.provider_subject.clone()),
                email: Set(profile_data.email.clone()),
                username: Set(profile_data.username.clone()),
                display_name: Set(profile_data.display_name.clone()),
                avatar_url: Set(profile_data.avatar_url.clone()),
                created_at: Set(Some(chrono::Utc::now())),
                updated_at: Set(Some(chrono::Utc::now())),
            };
            active.insert(&self.db).await
        };

        saved.map(to_domain).map_err(map_db_err)
    }
}
