use tracing::{info, instrument};

use platform_config::AppConfig;
use platform_core::{AppError, EntityIdentifier, with_deadline};
use platform_db::{StoreError, Stores};
use platform_models::{
    CreateServiceDto, HubService, MarketingService, PublicService, Service, UpdateServiceDto,
};

/// Use cases over the service catalogue.
pub struct CatalogService;

impl CatalogService {
    #[instrument(skip(stores, config, dto), fields(name = %dto.name))]
    pub async fn create_service(
        stores: &Stores,
        config: &AppConfig,
        dto: CreateServiceDto,
    ) -> Result<Service, AppError> {
        with_deadline(config.context_timeout, async {
            let service = stores
                .services
                .create(dto)
                .await
                .map_err(StoreError::into_app_error)?;
            info!(service_id = service.id, "Service created");
            Ok(service)
        })
        .await
    }

    #[instrument(skip(stores, config))]
    pub async fn get_services(
        stores: &Stores,
        config: &AppConfig,
    ) -> Result<Vec<PublicService>, AppError> {
        with_deadline(config.context_timeout, async {
            let services = stores
                .services
                .fetch_all()
                .await
                .map_err(StoreError::into_app_error)?;
            Ok(services.into_iter().map(PublicService::from).collect())
        })
        .await
    }

    /// Looks a service up by numeric id or, for anything else, by name.
    #[instrument(skip(stores, config))]
    pub async fn get_service(
        stores: &Stores,
        config: &AppConfig,
        identifier: &str,
    ) -> Result<PublicService, AppError> {
        let identifier = EntityIdentifier::parse(identifier)?;

        with_deadline(config.context_timeout, async {
            let service = match identifier {
                EntityIdentifier::Id(id) => stores.services.get_by_id(id).await,
                EntityIdentifier::Natural(name) => stores.services.get_by_name(&name).await,
            }
            .map_err(StoreError::into_app_error)?;

            Ok(service.into())
        })
        .await
    }

    /// Hub cards for every service linked to the organization. An unknown
    /// organization is a 404 rather than an empty list.
    #[instrument(skip(stores, config))]
    pub async fn get_organization_services(
        stores: &Stores,
        config: &AppConfig,
        organization_id: i64,
    ) -> Result<Vec<HubService>, AppError> {
        with_deadline(config.context_timeout, async {
            stores
                .organizations
                .get_organization(organization_id)
                .await
                .map_err(StoreError::into_app_error)?;

            let services = stores
                .services
                .get_by_organization(organization_id)
                .await
                .map_err(StoreError::into_app_error)?;
            Ok(services.into_iter().map(HubService::from).collect())
        })
        .await
    }

    #[instrument(skip(stores, config))]
    pub async fn get_marketing_services(
        stores: &Stores,
        config: &AppConfig,
    ) -> Result<Vec<MarketingService>, AppError> {
        with_deadline(config.context_timeout, async {
            let services = stores
                .services
                .get_marketing()
                .await
                .map_err(StoreError::into_app_error)?;
            Ok(services.into_iter().map(MarketingService::from).collect())
        })
        .await
    }

    /// Makes a service available to an organization. Idempotent.
    #[instrument(skip(stores, config))]
    pub async fn set_availability_to_organization(
        stores: &Stores,
        config: &AppConfig,
        service_id: i64,
        organization_id: i64,
    ) -> Result<(), AppError> {
        with_deadline(config.context_timeout, async {
            stores
                .services
                .link_organization(service_id, organization_id)
                .await
                .map_err(StoreError::into_app_error)?;
            info!(service_id, organization_id, "Service made available");
            Ok(())
        })
        .await
    }

    #[instrument(skip(stores, config, dto))]
    pub async fn update_service(
        stores: &Stores,
        config: &AppConfig,
        id: i64,
        dto: UpdateServiceDto,
    ) -> Result<Service, AppError> {
        with_deadline(config.context_timeout, async {
            stores
                .services
                .update(id, dto)
                .await
                .map_err(StoreError::into_app_error)
        })
        .await
    }

    #[instrument(skip(stores, config))]
    pub async fn delete_service(
        stores: &Stores,
        config: &AppConfig,
        id: i64,
    ) -> Result<(), AppError> {
        with_deadline(config.context_timeout, async {
            stores
                .services
                .delete(id)
                .await
                .map_err(StoreError::into_app_error)?;
            info!(service_id = id, "Service deleted");
            Ok(())
        })
        .await
    }
}
