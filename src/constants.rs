#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Base URL of the Asana REST API
pub const ASANA_API_BASE: &str = "https://app.asana.com/api/1.0";

/// Number of tasks requested per page when listing a project
pub const ASANA_PAGE_LIMIT: u32 = 100;

/// Fields requested for every task in a project listing
pub const TASK_OPT_FIELDS: &str = "name,custom_fields";

/// Gid of the Asana custom field that stores a student's email address
pub const EMAIL_CUSTOM_FIELD_GID: &str = "1203266261019373";

/// Where `download-students` caches the roster
pub const DEFAULT_ROSTER_PATH: &str = "data/students.json";

/// Where the grade export is expected to be downloaded to
pub const DEFAULT_GRADES_PATH: &str = "data/grades.csv";

/// Scores below this fraction are reported while posting grades
pub const GRADE_WARNING_THRESHOLD: f64 = 0.7;

/// Group size used by `make-groups` when none is given
pub const DEFAULT_GROUP_SIZE: usize = 2;

/// Separator placed between names in a rendered group
pub const GROUP_NAME_SEPARATOR: &str = " - ";
