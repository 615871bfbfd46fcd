// handlers/public/pages.rs - GET /login, GET /register
//
// Page paths have no UI here; they answer with a small JSON descriptor so the
// gatekeeper's redirects have somewhere to land.

use serde::Serialize;

use crate::middleware::ApiResponse;
use crate::middleware::Identity;

#[derive(Debug, Serialize)]
pub struct Page {
    pub page: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<PageUser>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: crate::types::Role,
}

impl Page {
    pub fn anonymous(page: &'static str) -> ApiResponse<Page> {
        ApiResponse::success(Page { page, user: None })
    }

    pub fn for_identity(page: &'static str, identity: Identity) -> ApiResponse<Page> {
        ApiResponse::success(Page {
            page,
            user: Some(PageUser {
                id: identity.user_id,
                name: identity.name,
                email: identity.email,
                role: identity.role,
            }),
        })
    }
}

pub async fn login() -> ApiResponse<Page> {
    Page::anonymous("login")
}

pub async fn register() -> ApiResponse<Page> {
    Page::anonymous("register")
}
