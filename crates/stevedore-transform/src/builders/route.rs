//! `Route` builder.

use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use stevedore_common::types::ServiceConfig;

use crate::objects::{Route, RoutePort, RouteSpec, RouteTargetReference};

/// Builds a route exposing service `name` on `target_port`.
///
/// An expose directive of `"true"` leaves the host unset so the platform
/// picks one; any other value is used as the hostname.
#[must_use]
pub fn route(name: &str, config: &ServiceConfig, target_port: i32) -> Route {
    let host = config
        .expose_directive()
        .and_then(|directive| directive.host().map(str::to_string));

    Route::new(
        super::object_meta(name, config),
        RouteSpec {
            host,
            to: RouteTargetReference {
                kind: "Service",
                name: name.to_string(),
            },
            port: Some(RoutePort {
                target_port: IntOrString::Int(target_port),
            }),
        },
    )
}
