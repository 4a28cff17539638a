use rocket::Route;

pub mod admin;
pub mod auth;
pub mod voting;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(auth::routes());
    routes.extend(admin::routes());
    routes.extend(voting::routes());
    routes
}
