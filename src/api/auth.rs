use mongodb::bson::doc;
use rocket::{
    http::{Cookie, CookieJar, Status},
    serde::json::Json,
    Route, State,
};

use crate::{
    error::{Error, Result},
    model::{
        api::{admin::AdminCredentials, student::CredentialClaim},
        auth::{AuthToken, AUTH_TOKEN_COOKIE},
        db::{admin::Admin, student::Student},
        mongodb::Coll,
    },
    Config,
};

pub fn routes() -> Vec<Route> {
    routes![
        authenticate_admin,
        authenticate_student,
        authenticate_by_access_token,
        logout,
    ]
}

#[post("/auth/admin", data = "<credentials>", format = "json")]
pub async fn authenticate_admin(
    cookies: &CookieJar<'_>,
    credentials: Json<AdminCredentials>,
    admins: Coll<Admin>,
    config: &State<Config>,
) -> Result<()> {
    let with_username = doc! {
        "username": &credentials.username
    };

    let admin = admins
        .find_one(with_username, None)
        .await?
        .filter(|admin| admin.verify_password(&credentials.password))
        .ok_or_else(|| {
            Error::Status(
                Status::Unauthorized,
                "No admin found with the provided username and password combination.".to_string(),
            )
        })?;

    let token = AuthToken::new(&admin);
    cookies.add(token.into_cookie(config));

    Ok(())
}

/// Log a student in with the short credential they typed from their certificate.
#[post("/auth/student", data = "<claim>", format = "json")]
pub async fn authenticate_student(
    cookies: &CookieJar<'_>,
    claim: Json<CredentialClaim>,
    students: Coll<Student>,
    config: &State<Config>,
) -> Result<()> {
    let with_credential = doc! {
        "credential": &claim.credential
    };
    let student = students
        .find_one(with_credential, None)
        .await?
        .ok_or(Error::InvalidCredential)?;
    start_voting_session(cookies, &student, config)
}

/// Log a student in with the opaque token their QR code points at.
/// Same semantics as the credential form, different lookup key.
#[get("/auth/student/access/<token>")]
pub async fn authenticate_by_access_token(
    cookies: &CookieJar<'_>,
    token: String,
    students: Coll<Student>,
    config: &State<Config>,
) -> Result<()> {
    let with_access_token = doc! {
        "access_token": &token
    };
    let student = students
        .find_one(with_access_token, None)
        .await?
        .ok_or(Error::InvalidCredential)?;
    start_voting_session(cookies, &student, config)
}

/// Issue the session cookie, unless the student has already cast their
/// ballot, in which case they can never authenticate again.
fn start_voting_session(
    cookies: &CookieJar<'_>,
    student: &Student,
    config: &Config,
) -> Result<()> {
    if student.voted {
        return Err(Error::AlreadyVoted);
    }

    let token = AuthToken::new(student);
    cookies.add(token.into_cookie(config));

    Ok(())
}

#[delete("/auth")]
pub fn logout(cookies: &CookieJar) -> Status {
    cookies.remove(Cookie::named(AUTH_TOKEN_COOKIE));
    Status::Ok
}

#[cfg(test)]
mod tests {
    use mongodb::bson::DateTime;
    use rocket::{http::ContentType, local::asynchronous::Client, serde::json::serde_json::json};

    use crate::model::db::{admin::NewAdmin, student::NewStudent};

    use super::*;

    #[backend_test]
    async fn admin_authenticate_valid(client: Client, admins: Coll<NewAdmin>) {
        // Ensure there is an admin to login as
        admins.insert_one(NewAdmin::example(), None).await.unwrap();

        // Use valid credentials to attempt admin login
        let response = client
            .post(uri!(authenticate_admin))
            .header(ContentType::JSON)
            .body(json!(AdminCredentials::example1()).to_string())
            .dispatch()
            .await;

        assert_eq!(Status::Ok, response.status());
        assert!(client.cookies().get(AUTH_TOKEN_COOKIE).is_some());
    }

    #[backend_test]
    async fn admin_authenticate_invalid(client: Client, admins: Coll<NewAdmin>) {
        // Ensure there is an admin to fail to login as
        admins.insert_one(NewAdmin::example(), None).await.unwrap();

        // Use invalid username to attempt admin login
        let response = client
            .post(uri!(authenticate_admin))
            .header(ContentType::JSON)
            .body(json!(AdminCredentials::empty()).to_string())
            .dispatch()
            .await;

        assert_eq!(Status::Unauthorized, response.status());
        assert_eq!(None, client.cookies().get(AUTH_TOKEN_COOKIE));

        // Use invalid password to attempt admin login
        let response = client
            .post(uri!(authenticate_admin))
            .header(ContentType::JSON)
            .body(
                json!({
                    "username": &NewAdmin::example().username,
                    "password": "",
                })
                .to_string(),
            )
            .dispatch()
            .await;

        assert_eq!(Status::Unauthorized, response.status());
        assert_eq!(None, client.cookies().get(AUTH_TOKEN_COOKIE));
    }

    #[backend_test]
    async fn student_authenticate_by_credential(client: Client, students: Coll<NewStudent>) {
        let student = NewStudent::example();
        students.insert_one(&student, None).await.unwrap();

        // A wrong credential must not start a session.
        let response = client
            .post(uri!(authenticate_student))
            .header(ContentType::JSON)
            .body(json!({ "credential": "WRONG1" }).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Unauthorized, response.status());
        assert_eq!(None, client.cookies().get(AUTH_TOKEN_COOKIE));

        // The right credential starts one.
        let response = client
            .post(uri!(authenticate_student))
            .header(ContentType::JSON)
            .body(json!({ "credential": student.credential }).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        assert!(client.cookies().get(AUTH_TOKEN_COOKIE).is_some());
    }

    #[backend_test]
    async fn student_authenticate_by_access_token(client: Client, students: Coll<NewStudent>) {
        let student = NewStudent::example();
        students.insert_one(&student, None).await.unwrap();

        // An unknown token must not start a session.
        let response = client
            .get(uri!(authenticate_by_access_token("not-a-real-token")))
            .dispatch()
            .await;
        assert_eq!(Status::Unauthorized, response.status());
        assert_eq!(None, client.cookies().get(AUTH_TOKEN_COOKIE));

        // Scanning the real QR target starts one.
        let response = client
            .get(uri!(authenticate_by_access_token(student.access_token)))
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        assert!(client.cookies().get(AUTH_TOKEN_COOKIE).is_some());
    }

    #[backend_test]
    async fn voted_student_cannot_authenticate(client: Client, students: Coll<NewStudent>) {
        let mut student = NewStudent::example();
        student.voted = true;
        student.voted_at = Some(DateTime::now());
        students.insert_one(&student, None).await.unwrap();

        // Neither login route works once the ballot is cast.
        let response = client
            .post(uri!(authenticate_student))
            .header(ContentType::JSON)
            .body(json!({ "credential": student.credential }).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Conflict, response.status());
        assert_eq!(None, client.cookies().get(AUTH_TOKEN_COOKIE));

        let response = client
            .get(uri!(authenticate_by_access_token(student.access_token)))
            .dispatch()
            .await;
        assert_eq!(Status::Conflict, response.status());
        assert_eq!(None, client.cookies().get(AUTH_TOKEN_COOKIE));
    }

    #[backend_test(admin)]
    async fn logout_admin(client: Client) {
        let response = client.delete(uri!(logout)).dispatch().await;

        assert_eq!(Status::Ok, response.status());
        assert_eq!(None, client.cookies().get(AUTH_TOKEN_COOKIE));
    }

    #[backend_test]
    async fn logout_student(client: Client, students: Coll<NewStudent>) {
        let student = NewStudent::example();
        students.insert_one(&student, None).await.unwrap();

        client
            .post(uri!(authenticate_student))
            .header(ContentType::JSON)
            .body(json!({ "credential": student.credential }).to_string())
            .dispatch()
            .await;
        assert!(client.cookies().get(AUTH_TOKEN_COOKIE).is_some());

        // Abandoning the session persists nothing; logging back in works.
        let response = client.delete(uri!(logout)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        assert_eq!(None, client.cookies().get(AUTH_TOKEN_COOKIE));

        let response = client
            .post(uri!(authenticate_student))
            .header(ContentType::JSON)
            .body(json!({ "credential": student.credential }).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
    }

    #[backend_test]
    async fn logout_not_logged_in(client: Client) {
        let response = client.delete(uri!(logout)).dispatch().await;

        assert_eq!(Status::Ok, response.status());
    }
}
