// handlers/protected/pages.rs - role home pages
//
// The gatekeeper has already matched the role to the path prefix.

use crate::handlers::public::pages::Page;
use crate::middleware::{ApiResponse, Identity};

/// GET /dashboard[/*] - TEAM_LEADER home
pub async fn dashboard(identity: Identity) -> ApiResponse<Page> {
    Page::for_identity("dashboard", identity)
}

/// GET /coordinator[/*]
pub async fn coordinator(identity: Identity) -> ApiResponse<Page> {
    Page::for_identity("coordinator", identity)
}

/// GET /admin[/*]
pub async fn admin(identity: Identity) -> ApiResponse<Page> {
    Page::for_identity("admin", identity)
}
