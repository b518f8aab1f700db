//! Handlers for the `/tickets` and `/comments` resources.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use helpdesk_core::audit::target_types;
use helpdesk_core::error::CoreError;
use helpdesk_core::policy::{self, Action, TicketRefs};
use helpdesk_core::roles::{ROLE_AGENT, ROLE_CLIENT};
use helpdesk_core::types::DbId;
use helpdesk_db::models::comment::CreateComment;
use helpdesk_db::models::ticket::{CreateTicket, Ticket, UpdateTicket};
use helpdesk_db::repositories::{ActivityLogRepo, CommentRepo, TicketRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Load a ticket and check the actor may perform `action` on it.
async fn load_authorized(
    state: &AppState,
    auth: &AuthUser,
    id: DbId,
    action: Action,
) -> Result<Ticket, AppError> {
    let ticket = TicketRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Ticket",
            id,
        }))?;
    let refs = TicketRefs {
        user_id: ticket.user_id,
        agent_id: ticket.agent_id,
    };
    policy::authorize_ticket(&auth.actor(), &refs, action).map_err(AppError::Core)?;
    Ok(ticket)
}

/// GET /tickets
///
/// Role-scoped listing: clients see their own tickets, agents see tickets
/// assigned to them plus unassigned tickets in their department, admins see
/// everything.
pub async fn list_tickets(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let tickets = match auth.role.as_str() {
        ROLE_CLIENT => TicketRepo::list_for_owner(&state.pool, auth.user_id).await?,
        ROLE_AGENT => {
            let department_id = UserRepo::find_by_id(&state.pool, auth.user_id)
                .await?
                .and_then(|u| u.department_id);
            TicketRepo::list_for_agent(&state.pool, auth.user_id, department_id).await?
        }
        _ => TicketRepo::list_all(&state.pool).await?,
    };

    Ok(Json(DataResponse { data: tickets }))
}

/// POST /tickets
pub async fn create_ticket(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateTicket>,
) -> AppResult<impl IntoResponse> {
    let ticket = state.pipeline.create_ticket(&auth.actor(), &input).await?;

    tracing::info!(
        user_id = auth.user_id,
        ticket_id = ticket.id,
        department_id = ticket.department_id,
        "Ticket created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: ticket })))
}

/// GET /tickets/{id}
pub async fn get_ticket(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let ticket = load_authorized(&state, &auth, id, Action::Read).await?;
    Ok(Json(DataResponse { data: ticket }))
}

/// PUT /tickets/{id}
pub async fn update_ticket(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTicket>,
) -> AppResult<impl IntoResponse> {
    let ticket = state
        .pipeline
        .update_ticket(&auth.actor(), id, &input)
        .await?;

    tracing::info!(user_id = auth.user_id, ticket_id = id, "Ticket updated");

    Ok(Json(DataResponse { data: ticket }))
}

/// DELETE /tickets/{id}
pub async fn delete_ticket(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    state.pipeline.delete_ticket(&auth.actor(), id).await?;

    tracing::info!(user_id = auth.user_id, ticket_id = id, "Ticket deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// GET /tickets/{id}/comments
pub async fn list_comments(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    load_authorized(&state, &auth, id, Action::Read).await?;
    let comments = CommentRepo::list_for_ticket(&state.pool, id).await?;
    Ok(Json(DataResponse { data: comments }))
}

/// POST /tickets/{id}/comments
pub async fn add_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CreateComment>,
) -> AppResult<impl IntoResponse> {
    let comment = state
        .pipeline
        .add_comment(&auth.actor(), id, &input.text)
        .await?;

    tracing::info!(
        user_id = auth.user_id,
        ticket_id = id,
        comment_id = comment.id,
        "Comment added"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: comment })))
}

/// DELETE /comments/{id}
pub async fn delete_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    state.pipeline.delete_comment(&auth.actor(), id).await?;

    tracing::info!(user_id = auth.user_id, comment_id = id, "Comment deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// GET /tickets/{id}/history
///
/// The ticket's audit trail, oldest first.
pub async fn ticket_history(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    load_authorized(&state, &auth, id, Action::Read).await?;
    let entries = ActivityLogRepo::list_for_target(&state.pool, target_types::TICKET, id).await?;
    Ok(Json(DataResponse { data: entries }))
}
