// handlers/mod.rs - handler tiers
//
// Public (no session) -> Protected (any signed-in role) -> Elevated (SUPER_ADMIN,
// enforced by the gatekeeper on /api/admin and again by the action table)
pub mod elevated;
pub mod protected;
pub mod public;

use serde::Serialize;

/// Payload of endpoints that only confirm an action
#[derive(Debug, Serialize)]
pub struct Done {
    pub message: &'static str,
}

impl Done {
    pub fn new(message: &'static str) -> Self {
        Self { message }
    }
}
