use crate::errors::AppError;
use crate::forms::{self, validate_form};
use crate::helpers::JsonResponse;
use crate::models;
use crate::state::AppState;
use actix_web::{get, post, web, HttpResponse};
use std::sync::Arc;

/// The tenant already exists once the bearer check passed; sign-up only fills the profile.
#[tracing::instrument(name = "Register tenant", skip(tenant, state, form))]
#[post("/register")]
pub async fn register_handler(
    tenant: web::ReqData<Arc<models::Tenant>>,
    form: Option<web::Json<forms::RegisterForm>>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let form = form.map(web::Json::into_inner).unwrap_or_default();
    validate_form(&form)?;

    let company_name = form.company_name.filter(|v| !v.trim().is_empty());
    let phone = form.phone.filter(|v| !v.trim().is_empty());
    if company_name.is_none() && phone.is_none() {
        return Ok(JsonResponse::build()
            .set_item(models::Tenant::clone(&tenant))
            .ok("User registered"));
    }

    let updated = state
        .store()?
        .update_tenant_profile(tenant.id, company_name, phone)
        .await?;
    Ok(JsonResponse::build().set_item(updated).ok("User registered"))
}

#[tracing::instrument(name = "Login tenant", skip(tenant))]
#[post("/login")]
pub async fn login_handler(tenant: web::ReqData<Arc<models::Tenant>>) -> HttpResponse {
    JsonResponse::build()
        .set_item(models::Tenant::clone(&tenant))
        .ok("Login successful")
}

#[tracing::instrument(name = "Current tenant", skip(tenant))]
#[get("/me")]
pub async fn me_handler(tenant: web::ReqData<Arc<models::Tenant>>) -> HttpResponse {
    JsonResponse::build()
        .set_item(models::Tenant::clone(&tenant))
        .ok("OK")
}
