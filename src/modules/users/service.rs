use tracing::{info, instrument};

use platform_config::AppConfig;
use platform_core::{AppError, EntityIdentifier, hash_password_blocking, with_deadline};
use platform_db::{StoreError, Stores, Visibility};
use platform_models::{CreateUserDto, NewUser, PublicUser, UpdateUserDto, UserPatch};

pub struct UserService;

impl UserService {
    #[instrument(skip(stores, config, dto), fields(email = %dto.email))]
    pub async fn create_user(
        stores: &Stores,
        config: &AppConfig,
        dto: CreateUserDto,
    ) -> Result<PublicUser, AppError> {
        with_deadline(config.context_timeout, async {
            let password_hash = hash_password_blocking(dto.password, config.bcrypt_cost).await?;
            let display_name = dto
                .display_name
                .unwrap_or_else(|| dto.email.split('@').next().unwrap_or_default().to_string());

            let user = stores
                .users
                .create(NewUser {
                    email: dto.email,
                    password_hash,
                    display_name,
                    role_id: dto.role_id,
                    organization_id: dto.organization_id,
                })
                .await
                .map_err(StoreError::into_app_error)?;

            info!(user_id = user.id, role_id = user.role_id, "User created");
            Ok(user.into())
        })
        .await
    }

    /// Active users only.
    #[instrument(skip(stores, config))]
    pub async fn get_users(stores: &Stores, config: &AppConfig) -> Result<Vec<PublicUser>, AppError> {
        with_deadline(config.context_timeout, async {
            let users = stores
                .users
                .fetch_active()
                .await
                .map_err(StoreError::into_app_error)?;
            Ok(users.into_iter().map(PublicUser::from).collect())
        })
        .await
    }

    /// Looks a user up by numeric id or, for anything else, by email.
    #[instrument(skip(stores, config))]
    pub async fn get_user(
        stores: &Stores,
        config: &AppConfig,
        identifier: &str,
    ) -> Result<PublicUser, AppError> {
        let identifier = EntityIdentifier::parse(identifier)?;

        with_deadline(config.context_timeout, async {
            let user = match identifier {
                EntityIdentifier::Id(id) => stores.users.find_by_id(id, Visibility::Active).await,
                EntityIdentifier::Natural(email) => {
                    stores.users.find_by_email(&email, Visibility::Active).await
                }
            }
            .map_err(StoreError::into_app_error)?;

            Ok(user.into())
        })
        .await
    }

    #[instrument(skip(stores, config, dto))]
    pub async fn update_user(
        stores: &Stores,
        config: &AppConfig,
        id: i64,
        dto: UpdateUserDto,
    ) -> Result<PublicUser, AppError> {
        with_deadline(config.context_timeout, async {
            let password_hash = match dto.password {
                Some(password) => Some(hash_password_blocking(password, config.bcrypt_cost).await?),
                None => None,
            };

            let patch = UserPatch {
                email: dto.email,
                password_hash,
                display_name: dto.display_name,
                role_id: dto.role_id,
                organization_id: dto.organization_id,
            };

            let user = stores
                .users
                .update(id, patch)
                .await
                .map_err(StoreError::into_app_error)?;

            Ok(user.into())
        })
        .await
    }

    /// Soft delete. The row stays but drops out of every active lookup.
    #[instrument(skip(stores, config))]
    pub async fn archive_user(stores: &Stores, config: &AppConfig, id: i64) -> Result<(), AppError> {
        with_deadline(config.context_timeout, async {
            stores
                .users
                .archive(id)
                .await
                .map_err(StoreError::into_app_error)?;
            info!(user_id = id, "User archived");
            Ok(())
        })
        .await
    }
}
