use super::entities::{launch, Launch as LaunchEntity};
use super::{contains_any, map_db_err};
use crate::application::ports::LaunchStore;
use crate::domain::{Launch, LaunchQuery, LaunchSort, LaunchStatus, NewLaunch};
use async_trait::async_trait;
use dublaunch_errors::AppError;
use sea_orm::sea_query::Expr;
use sea_orm::{entity::*, query::*, DatabaseConnection, DbErr};
use uuid::Uuid;

#[derive(Clone)]
pub struct LaunchRepository {
    db: DatabaseConnection,
}

impl LaunchRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

pub(super) fn to_domain(model: launch::Model) -> Result<Launch, DbErr> {
    let tags = serde_json::from_value(model.tags).map_err(|e| DbErr::Json(e.to_string()))?;
    Ok(Launch {
        id: model.id,
        slug: model.slug,
        name: model.name,
        tagline: model.tagline,
        description: model.description,
        website_url: model.website_url,
        primary_category: model.primary_category,
        tags,
        pricing_type: model.pricing_type.parse().map_err(DbErr::Type)?,
        creator_id: model.creator_id,
        status: model.status.parse().map_err(DbErr::Type)?,
        votes_count: model.votes_count,
        comments_count: model.comments_count,
        views_count: model.views_count,
        created_at: model.created_at,
    })
}

#[async_trait]
impl LaunchStore for LaunchRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Launch>, AppError> {
        LaunchEntity::find_by_id(id)
            .one(&self.db)
            .await
            .and_then(|m| m.map(to_domain).transpose())
            .map_err(map_db_err)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Launch>, AppError> {
        LaunchEntity::find()
            .filter(launch::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .and_then(|m| m.map(to_domain).transpose())
            .map_err(map_db_err)
    }

    async fn slug_exists(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool, AppError> {
        let mut query = LaunchEntity::find().filter(launch::Column::Slug.eq(slug));
        if let Some(id) = exclude {
            query = query.filter(launch::Column::Id.ne(id));
        }
        let taken = query.one(&self.db).await.map_err(map_db_err)?;
        Ok(taken.is_some())
    }

    async fn insert(&self, launch_data: NewLaunch) -> Result<Launch, AppError> {
        let active = launch::ActiveModel {
            id: Set(launch_data.id),
            slug: Set(launch_data.slug),
            name: Set(launch_data.name),
            tagline: Set(launch_data.tagline),
            description: Set(launch_data.description),
            website_url: Set(launch_data.website_url),
            primary_category: Set(launch_data.primary_category),
            tags: Set(serde_json::json!(launch_data.tags)),
            pricing_type: Set(launch_data.pricing_type.as_str().to_string()),
            creator_id: Set(launch_data.creator_id),
            status: Set(launch_data.status.as_str().to_string()),
            votes_count: Set(0),
            comments_count: Set(0),
            views_count: Set(0),
            created_at: Set(chrono::Utc::now()),
        };
        let model = active.insert(&self.db).await.map_err(map_db_err)?;
        to_domain(model).map_err(map_db_err)
    }

    async fn list(&self, query: &LaunchQuery) -> Result<Vec<Launch>, AppError> {
        let mut select =
            LaunchEntity::find().filter(launch::Column::Status.eq(LaunchStatus::Published.as_str()));

        if let Some(category) = &query.category {
            select = select.filter(launch::Column::PrimaryCategory.eq(category.as_str()));
        }
        if let Some(creator) = query.creator {
            select = select.filter(launch::Column::CreatorId.eq(creator));
        }
        if let Some(term) = query.text_term() {
            select = select.filter(contains_any(
                &[
                    launch::Column::Name,
                    launch::Column::Tagline,
                    launch::Column::Description,
                ],
                term,
            ));
        }

        select = match query.sort {
            LaunchSort::Newest => select.order_by_desc(launch::Column::CreatedAt),
            LaunchSort::Oldest => select.order_by_asc(launch::Column::CreatedAt),
            LaunchSort::MostVoted => select
                .order_by_desc(launch::Column::VotesCount)
                .order_by_desc(launch::Column::CreatedAt),
            LaunchSort::MostViewed => select
                .order_by_desc(launch::Column::ViewsCount)
                .order_by_desc(launch::Column::CreatedAt),
        };

        let models = select
            .limit(query.limit_or_default())
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        models
            .into_iter()
            .map(|m| to_domain(m).map_err(map_db_err))
            .collect()
    }

    async fn record_view(&self, id: Uuid) -> Result<i32, AppError> {
        let result = LaunchEntity::update_many()
            .col_expr(
                launch::Column::ViewsCount,
                Expr::col(launch::Column::ViewsCount).add(1),
            )
            .filter(launch::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(AppError::not_found("launch"));
        }

        let launch = LaunchEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .ok_or_else(|| AppError::not_found("launch"))?;
        Ok(launch.views_count)
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        // Votes and comments go with it through ON DELETE CASCADE.
        let result = LaunchEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;
        if result.rows_affected == 0 {
            return Err(AppError::not_found("launch"));
        }
        Ok(())
    }
}
