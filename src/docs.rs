use crate::api::fingerprint::{
    BindRequest, BindResponse, EmployeeSummary, IdentifyRequest, IdentifyResponse,
};
use crate::model::employee::Employee;
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Asistencia API",
        version = "0.1.0",
        description = r#"
## Employee attendance check-in

JSON endpoints used by the QR kiosk page to recognise a device.

### Device fingerprint
- **identify**: which employee, if any, this device is bound to
- **bind**: remember this device for an employee (latest bind wins)

The HTML check-in form, the staff login and the Excel downloads are
served as pages and are not part of this document.
"#,
    ),
    paths(
        crate::api::fingerprint::identify,
        crate::api::fingerprint::bind,
    ),
    components(
        schemas(
            IdentifyRequest,
            IdentifyResponse,
            BindRequest,
            BindResponse,
            EmployeeSummary,
            Employee
        )
    ),
    tags(
        (name = "Fingerprint", description = "Device recognition for the kiosk"),
    )
)]
pub struct ApiDoc;

/// The document with every path mounted under `api_prefix`.
pub fn api_doc(api_prefix: &str) -> openapi::OpenApi {
    let prefix = api_prefix.trim_end_matches('/');
    let mut doc = ApiDoc::openapi();
    doc.paths.paths = std::mem::take(&mut doc.paths.paths)
        .into_iter()
        .map(|(path, item)| (format!("{prefix}{path}"), item))
        .collect();
    doc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_both_fingerprint_endpoints() {
        let doc = api_doc("/api");
        assert!(doc.paths.paths.contains_key("/api/fingerprint/identify"));
        assert!(doc.paths.paths.contains_key("/api/fingerprint/bind"));
    }

    #[test]
    fn paths_follow_the_configured_prefix() {
        let doc = api_doc("/kiosk/v2/");
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        assert_eq!(paths, ["/kiosk/v2/fingerprint/bind", "/kiosk/v2/fingerprint/identify"]);
    }
}
