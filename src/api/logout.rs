use axum::{Extension, response::Redirect};

use super::AppError;
use crate::{server::routes, session::Session};

pub async fn logout(Extension(session): Extension<Session>) -> Result<Redirect, AppError> {
    session.clear().await?;
    Ok(Redirect::to(routes::HOME))
}
