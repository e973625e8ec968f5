// User service declared with actix-web extractors
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Post {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    pub page: Option<u32>,
    #[serde(rename = "perPage")]
    pub per_page: Option<u32>,
}

#[api("/users")]
#[scope("/users")]
pub struct UserResource;

impl UserResource {
    #[get]
    #[api_operation("List users")]
    pub async fn list(query: web::Query<Pagination>, req: HttpRequest) -> web::Json<Vec<User>> {
        unimplemented!()
    }

    #[post]
    #[api_operation("Create a user")]
    #[api_response(code = 201, message = "User created", response = "User")]
    pub async fn create(body: web::Json<CreateUser>, state: web::Data<AppState>) -> HttpResponse {
        unimplemented!()
    }

    #[route("/{user_id}", method = "GET")]
    #[api_operation("Find a user")]
    pub async fn find(web::Path(user_id): web::Path<u64>) -> Result<web::Json<User>, ApiError> {
        unimplemented!()
    }

    #[put("/{user_id}/posts/{post_id}")]
    #[api_operation("Replace a post")]
    pub async fn replace_post(
        web::Path((user_id, post_id)): web::Path<(u64, String)>,
        post: web::Json<Post>,
    ) -> HttpResponse {
        unimplemented!()
    }
}

#[api("/health")]
#[scope("/health")]
pub struct HealthResource;

impl HealthResource {
    #[get]
    #[api_operation("Health check")]
    pub async fn check() -> &'static str {
        "OK"
    }
}
