use crate::dto::HealthRes;

/// Health check shared by every StoreIt front end.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    pub fn new() -> Self {
        Self
    }

    /// Reports the service as alive. No backend is contacted.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "StoreIt is alive".into(),
        }
    }
}
