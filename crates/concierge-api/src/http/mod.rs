//! HTTP REST API endpoints.
//!
//! | Endpoint | Method | Description |
//! |----------|--------|-------------|
//! | `/api/chat` | POST | Answer a chat message through the gateway |
//! | `/api/profile/{target_user_id}` | GET | Fetch one profile for `currentUserId` |
//! | `/api/users` | GET | List selectable users |
//! | `/health` | GET | Liveness probe |
//! | `/metrics` | GET | Prometheus metrics (observability router only) |

pub mod routes;
pub mod state;

pub use routes::{
    create_router, create_router_with_body_limit, create_router_with_observability,
    create_router_with_observability_and_limit, error_codes, ApiError, ChatRequest, ChatResponse,
    UserSummary, DEFAULT_BODY_LIMIT,
};
pub use state::{AppState, SharedGateway};
