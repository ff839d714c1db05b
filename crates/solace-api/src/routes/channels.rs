use axum::Json;
use axum::extract::State;

use solace_core::channel::{self, ChannelCapability};

use crate::client_ip::ClientIp;
use crate::error::ApiError;
use crate::rate_limit::Access;
use crate::state::AppState;

/// The static channel capability table.
pub async fn list_channels(
    State(state): State<AppState>,
    ip: ClientIp,
) -> Result<Json<Vec<&'static ChannelCapability>>, ApiError> {
    state.limiter.check(Access::Read, "channels", ip.as_str())?;
    Ok(Json(channel::capabilities()))
}
