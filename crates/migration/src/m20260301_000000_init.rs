//! Initial schema migration - creates all tables from scratch.
//!
//! It creates the complete schema for Prenota:
//!
//! - `users`: authentication and role assignment
//! - `rooms`: bookable rooms with an operational status
//! - `reservations`: booking requests with their lifecycle status
//! - `schedule_slots`: one (room, date, interval) occupation per row

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Password,
    FullName,
    Role,
}

#[derive(Iden)]
enum Rooms {
    Table,
    Id,
    Name,
    SubRoom,
    Capacity,
    Status,
}

#[derive(Iden)]
enum Reservations {
    Table,
    Id,
    Code,
    UserId,
    FullName,
    UserRole,
    Purpose,
    Advisor,
    Remarks,
    Participants,
    Equipments,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum ScheduleSlots {
    Table,
    Id,
    ReservationId,
    RoomId,
    Date,
    StartMinute,
    EndMinute,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .col(ColumnDef::new(Users::FullName).string().not_null())
                    .col(ColumnDef::new(Users::Role).string().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Rooms
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Rooms::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Rooms::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Rooms::Name).string().not_null())
                    .col(ColumnDef::new(Rooms::SubRoom).string().not_null())
                    .col(ColumnDef::new(Rooms::Capacity).integer().not_null())
                    .col(
                        ColumnDef::new(Rooms::Status)
                            .string()
                            .not_null()
                            .default("Available"),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-rooms-name-sub_room-unique")
                    .table(Rooms::Table)
                    .col(Rooms::Name)
                    .col(Rooms::SubRoom)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Reservations
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Reservations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Reservations::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Reservations::Code).string().not_null())
                    .col(ColumnDef::new(Reservations::UserId).string().not_null())
                    .col(ColumnDef::new(Reservations::FullName).string().not_null())
                    .col(ColumnDef::new(Reservations::UserRole).string().not_null())
                    .col(ColumnDef::new(Reservations::Purpose).string().not_null())
                    .col(ColumnDef::new(Reservations::Advisor).string())
                    .col(ColumnDef::new(Reservations::Remarks).string().not_null())
                    .col(
                        ColumnDef::new(Reservations::Participants)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Reservations::Equipments).string().not_null())
                    .col(
                        ColumnDef::new(Reservations::Status)
                            .string()
                            .not_null()
                            .default("Pending"),
                    )
                    .col(
                        ColumnDef::new(Reservations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Reservations::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-reservations-user_id")
                            .from(Reservations::Table, Reservations::UserId)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-reservations-code-unique")
                    .table(Reservations::Table)
                    .col(Reservations::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-reservations-user_id")
                    .table(Reservations::Table)
                    .col(Reservations::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-reservations-status")
                    .table(Reservations::Table)
                    .col(Reservations::Status)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Schedule slots
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ScheduleSlots::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ScheduleSlots::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ScheduleSlots::ReservationId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ScheduleSlots::RoomId).string().not_null())
                    .col(ColumnDef::new(ScheduleSlots::Date).date().not_null())
                    .col(
                        ColumnDef::new(ScheduleSlots::StartMinute)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ScheduleSlots::EndMinute)
                            .integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-schedule_slots-reservation_id")
                            .from(ScheduleSlots::Table, ScheduleSlots::ReservationId)
                            .to(Reservations::Table, Reservations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-schedule_slots-room_id")
                            .from(ScheduleSlots::Table, ScheduleSlots::RoomId)
                            .to(Rooms::Table, Rooms::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-schedule_slots-reservation_id")
                    .table(ScheduleSlots::Table)
                    .col(ScheduleSlots::ReservationId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-schedule_slots-room_id-date")
                    .table(ScheduleSlots::Table)
                    .col(ScheduleSlots::RoomId)
                    .col(ScheduleSlots::Date)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(ScheduleSlots::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Reservations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Rooms::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
