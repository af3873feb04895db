use metrics_exporter_prometheus::PrometheusHandle;
use school_hr::directory::{Role, RoleService, School, SchoolService, User, UserService};
use school_hr::employees::{EmployeeRecord, EmployeeService};
use school_hr::store::MemoryRepository;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type SchoolStore = MemoryRepository<School>;
pub(crate) type RoleStore = MemoryRepository<Role>;
pub(crate) type UserStore = MemoryRepository<User>;
pub(crate) type EmployeeStore = MemoryRepository<EmployeeRecord>;

/// Services wired over one shared set of stores.
#[derive(Clone)]
pub(crate) struct HrServices {
    pub(crate) schools: Arc<SchoolService<SchoolStore>>,
    pub(crate) roles: Arc<RoleService<RoleStore, UserStore>>,
    pub(crate) users: Arc<UserService<UserStore, RoleStore, SchoolStore>>,
    pub(crate) employees: Arc<EmployeeService<EmployeeStore, SchoolStore, UserStore>>,
}

impl HrServices {
    pub(crate) fn in_memory() -> Self {
        let schools = Arc::new(SchoolStore::default());
        let roles = Arc::new(RoleStore::default());
        let users = Arc::new(UserStore::default());
        let employees = Arc::new(EmployeeStore::default());

        Self {
            schools: Arc::new(SchoolService::new(schools.clone())),
            roles: Arc::new(RoleService::new(roles.clone(), users.clone())),
            users: Arc::new(UserService::new(users.clone(), roles, schools.clone())),
            employees: Arc::new(EmployeeService::new(employees, schools, users)),
        }
    }
}
