use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::{json, Map, Value};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{authz, errors, models, routes};

#[derive(OpenApi)]
#[openapi(
	paths(
		routes::health::health,
		routes::profile::get_profile,
		routes::profile::create_profile,
		routes::profile::update_profile,
		routes::departments::list_departments,
		routes::departments::get_department,
		routes::departments::create_department,
		routes::departments::update_department,
		routes::departments::delete_department,
		routes::roles::list_roles,
		routes::roles::get_role,
		routes::roles::create_role,
		routes::roles::update_role,
		routes::roles::delete_role,
		routes::admin::list_profiles,
		routes::admin::update_profile,
		routes::dashboard::dashboard
	),
	components(
		schemas(
			models::department::Department,
			models::department::DepartmentSummary,
			models::department::DepartmentCreateRequest,
			models::department::DepartmentUpdateRequest,
			models::role::Role,
			models::role::RoleSummary,
			models::role::RoleCreateRequest,
			models::role::RoleUpdateRequest,
			models::profile::Profile,
			models::profile::ProfileCreateRequest,
			models::profile::ProfileUpdateRequest,
			models::profile::AdminProfileUpdateRequest,
			authz::RoleLevel,
			authz::ProfileStatus,
			authz::ProfileState,
			errors::ErrorResponse,
			errors::ReasonCode,
			routes::MessageResponse,
			routes::health::HealthResponse,
			routes::dashboard::DashboardResponse
		)
	),
	tags(
		(name = "Health", description = "Liveness and database reachability"),
		(name = "Profile", description = "Self-service profile lifecycle"),
		(name = "Departments", description = "Department reference data"),
		(name = "Roles", description = "Role reference data"),
		(name = "Admin", description = "Profile approval and reassignment"),
		(name = "Dashboard", description = "Member-only summary")
	)
)]
pub struct ApiDoc;

pub fn build_openapi(port: u16) -> anyhow::Result<utoipa::openapi::OpenApi> {
	let mut doc = serde_json::to_value(ApiDoc::openapi())?;

	ensure_security_components(&mut doc);
	ensure_global_security(&mut doc);
	ensure_servers(&mut doc, port);

	Ok(serde_json::from_value(doc)?)
}

pub fn swagger_routes(doc: utoipa::openapi::OpenApi) -> anyhow::Result<Router> {
	let swagger_config = utoipa_swagger_ui::Config::new(["/api-docs/openapi.json"])
		.try_it_out_enabled(true)
		.with_credentials(true)
		.persist_authorization(true);

	let doc_json = Arc::new(serde_json::to_value(&doc)?);

	let json_route = {
		let doc_json = Arc::clone(&doc_json);
		get(move || {
			let doc_json = Arc::clone(&doc_json);
			async move { Json((*doc_json).clone()) }
		})
	};

	Ok(Router::new()
		.route("/api-docs/openapi.json", json_route)
		.merge(SwaggerUi::new("/docs").config(swagger_config)))
}

fn object_entry<'a>(parent: &'a mut Value, key: &str) -> Option<&'a mut Map<String, Value>> {
	parent
		.as_object_mut()?
		.entry(key)
		.or_insert_with(|| Value::Object(Map::new()))
		.as_object_mut()
}

fn ensure_security_components(doc: &mut Value) {
	let Some(components) = object_entry(doc, "components") else {
		return;
	};
	let schemes = components
		.entry("securitySchemes")
		.or_insert_with(|| Value::Object(Map::new()));

	if let Some(schemes) = schemes.as_object_mut() {
		schemes.insert(
			"bearerAuth".to_string(),
			json!({
				"type": "http",
				"scheme": "bearer",
				"bearerFormat": "JWT",
				"description": "Session token from the identity provider; the access_token cookie is accepted too"
			}),
		);
	}
}

fn ensure_global_security(doc: &mut Value) {
	if let Some(root) = doc.as_object_mut() {
		root.entry("security").or_insert_with(|| json!([{ "bearerAuth": [] }]));
	}
}

fn ensure_servers(doc: &mut Value, port: u16) {
	let server_url = format!("http://localhost:{}", port);

	match doc.get_mut("servers") {
		Some(Value::Array(arr)) => {
			let has = arr.iter().any(|v| v.get("url").and_then(Value::as_str) == Some(server_url.as_str()));
			if !has {
				arr.push(json!({ "url": server_url }));
			}
		}
		_ => {
			doc["servers"] = json!([{ "url": server_url }]);
		}
	}
}
