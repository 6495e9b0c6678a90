use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    #[allow(clippy::too_many_lines)]
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Modules::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Modules::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Modules::Code).string_len(50).not_null())
                    .col(ColumnDef::new(Modules::DisplayName).string_len(100).not_null())
                    .col(ColumnDef::new(Modules::Description).text().null())
                    .col(ColumnDef::new(Modules::Category).string_len(50).null())
                    .col(ColumnDef::new(Modules::Icon).string_len(50).null())
                    .col(
                        ColumnDef::new(Modules::PricePerMonth)
                            .decimal_len(12, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Modules::DisplayOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Modules::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Modules::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Modules::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_modules_code")
                    .table(Modules::Table)
                    .col(Modules::Code)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Plans::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Plans::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Plans::Code).string_len(50).not_null())
                    .col(ColumnDef::new(Plans::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Plans::Description).text().null())
                    .col(
                        ColumnDef::new(Plans::PriceMonthly)
                            .decimal_len(12, 2)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Plans::PriceAnnual).decimal_len(12, 2).null())
                    .col(
                        ColumnDef::new(Plans::TrialDays)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Plans::DisplayOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Plans::Active).boolean().not_null().default(true))
                    .col(ColumnDef::new(Plans::Color).string_len(20).null())
                    .col(ColumnDef::new(Plans::BillingProductId).string_len(255).null())
                    .col(
                        ColumnDef::new(Plans::BillingMonthlyPriceId)
                            .string_len(255)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Plans::BillingAnnualPriceId)
                            .string_len(255)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Plans::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Plans::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_plans_code")
                    .table(Plans::Table)
                    .col(Plans::Code)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PlanModules::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PlanModules::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PlanModules::PlanId).uuid().not_null())
                    .col(ColumnDef::new(PlanModules::ModuleId).uuid().not_null())
                    .col(ColumnDef::new(PlanModules::UsageLimit).integer().null())
                    .col(ColumnDef::new(PlanModules::Config).json().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_plan_modules_plan")
                            .from(PlanModules::Table, PlanModules::PlanId)
                            .to(Plans::Table, Plans::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_plan_modules_module")
                            .from(PlanModules::Table, PlanModules::ModuleId)
                            .to(Modules::Table, Modules::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_plan_modules_plan_module")
                    .table(PlanModules::Table)
                    .col(PlanModules::PlanId)
                    .col(PlanModules::ModuleId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Clients::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Clients::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Clients::TenantId).uuid().not_null())
                    .col(ColumnDef::new(Clients::DisplayName).string_len(200).not_null())
                    .col(
                        ColumnDef::new(Clients::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Clients::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_clients_tenant")
                    .table(Clients::Table)
                    .col(Clients::TenantId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ClientSubscriptions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClientSubscriptions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ClientSubscriptions::TenantId).uuid().not_null())
                    .col(ColumnDef::new(ClientSubscriptions::ClientId).uuid().not_null())
                    .col(ColumnDef::new(ClientSubscriptions::PlanId).uuid().not_null())
                    .col(
                        ColumnDef::new(ClientSubscriptions::Status)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClientSubscriptions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClientSubscriptions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_client_subscriptions_client")
                            .from(ClientSubscriptions::Table, ClientSubscriptions::ClientId)
                            .to(Clients::Table, Clients::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_client_subscriptions_plan")
                            .from(ClientSubscriptions::Table, ClientSubscriptions::PlanId)
                            .to(Plans::Table, Plans::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_client_subscriptions_tenant_client")
                    .table(ClientSubscriptions::Table)
                    .col(ClientSubscriptions::TenantId)
                    .col(ClientSubscriptions::ClientId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ClientModules::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClientModules::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ClientModules::TenantId).uuid().not_null())
                    .col(ColumnDef::new(ClientModules::ClientId).uuid().not_null())
                    .col(ColumnDef::new(ClientModules::ModuleId).uuid().not_null())
                    .col(
                        ColumnDef::new(ClientModules::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(ClientModules::UsageLimit).integer().null())
                    .col(
                        ColumnDef::new(ClientModules::UsageCurrent)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(ClientModules::Config).json().null())
                    .col(
                        ColumnDef::new(ClientModules::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClientModules::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_client_modules_client")
                            .from(ClientModules::Table, ClientModules::ClientId)
                            .to(Clients::Table, Clients::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_client_modules_module")
                            .from(ClientModules::Table, ClientModules::ModuleId)
                            .to(Modules::Table, Modules::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_client_modules_client_module")
                    .table(ClientModules::Table)
                    .col(ClientModules::ClientId)
                    .col(ClientModules::ModuleId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_client_modules_tenant_active")
                    .table(ClientModules::Table)
                    .col(ClientModules::TenantId)
                    .col(ClientModules::Active)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            ClientModules::Table.into_iden(),
            ClientSubscriptions::Table.into_iden(),
            Clients::Table.into_iden(),
            PlanModules::Table.into_iden(),
            Plans::Table.into_iden(),
            Modules::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Modules {
    Table,
    Id,
    Code,
    DisplayName,
    Description,
    Category,
    Icon,
    PricePerMonth,
    DisplayOrder,
    Active,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Plans {
    Table,
    Id,
    Code,
    Name,
    Description,
    PriceMonthly,
    PriceAnnual,
    TrialDays,
    DisplayOrder,
    Active,
    Color,
    BillingProductId,
    BillingMonthlyPriceId,
    BillingAnnualPriceId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PlanModules {
    Table,
    Id,
    PlanId,
    ModuleId,
    UsageLimit,
    Config,
}

#[derive(DeriveIden)]
enum Clients {
    Table,
    Id,
    TenantId,
    DisplayName,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ClientSubscriptions {
    Table,
    Id,
    TenantId,
    ClientId,
    PlanId,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ClientModules {
    Table,
    Id,
    TenantId,
    ClientId,
    ModuleId,
    Active,
    UsageLimit,
    UsageCurrent,
    Config,
    CreatedAt,
    UpdatedAt,
}
