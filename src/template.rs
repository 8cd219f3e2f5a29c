//! Derivation of the teachers list template from the students one.
//!
//! The two Angular list pages share their layout, so the teachers page is produced by an
//! ordered series of literal replace-all rules. Later rules see the output of earlier ones,
//! which is why `student.studentId` must be rewritten before the broader `student.`.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Students template read by default.
pub const DEFAULT_STUDENTS_TEMPLATE: &str =
    "ClientApp/src/app/features/students/students.component.html";
/// Teachers template written by default.
pub const DEFAULT_TEACHERS_TEMPLATE: &str =
    "ClientApp/src/app/features/teachers/teachers.component.html";

/// Ordered `(from, to)` substitutions turning the students page into the teachers page.
pub const TEACHER_REPLACEMENTS: &[(&str, &str)] = &[
    ("students-container", "teachers-container"),
    ("students-table", "teachers-table"),
    ("Sinh viên", "Giáo viên"),
    ("sinh viên", "giáo viên"),
    ("student of students", "teacher of teachers"),
    (".student.", ".teacher."),
    ("selectedStudents", "selectedTeachers"),
    ("createStudent()", "router.navigate(['/teachers/new'])"),
    ("viewStudent(", "viewTeacher("),
    ("editStudent(", "editTeacher("),
    ("deleteStudent(", "deleteTeacher("),
    ("toggleSelectStudent(", "toggleSelectTeacher("),
    ("searchString", "searchTerm"),
    ("onSearchChange(searchTerm)", "onSearchChange()"),
    ("onSearchChange('')", "onSearchChange()"),
    ("selectedClassId", "selectedDepartment"),
    ("selectedDepartmentId", "selectedDepartment"),
    ("Lớp", "Khoa"),
    (".className", ".departmentName"),
    ("student.studentId", "teacher.teacherId"),
    ("student.", "teacher."),
    ("students.", "teachers."),
    ("students", "teachers"),
];

/// Errors raised while deriving the template.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The students template does not exist.
    #[error("Students template not found: {0}")]
    MissingInput(PathBuf),
    /// Reading or writing a template failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File being read or written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Result of one derivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Derivation {
    /// Rewritten template text.
    pub content: String,
    /// Number of rules that matched at least once.
    pub rules_applied: usize,
}

/// Apply [`TEACHER_REPLACEMENTS`] in order to `students`.
pub fn derive_teachers_template(students: &str) -> Derivation {
    let mut content = students.to_string();
    let mut rules_applied = 0;
    for (from, to) in TEACHER_REPLACEMENTS {
        if content.contains(from) {
            content = content.replace(from, to);
            rules_applied += 1;
        }
    }
    Derivation {
        content,
        rules_applied,
    }
}

/// Read the students template at `input`, derive the teachers page and write it to `output`.
pub fn write_teachers_template(input: &Path, output: &Path) -> Result<Derivation, TemplateError> {
    if !input.is_file() {
        return Err(TemplateError::MissingInput(input.to_path_buf()));
    }
    let students = fs::read_to_string(input).map_err(|source| TemplateError::Io {
        path: input.to_path_buf(),
        source,
    })?;
    let derivation = derive_teachers_template(&students);

    if let Some(parent) = output.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| TemplateError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(output, &derivation.content).map_err(|source| TemplateError::Io {
        path: output.to_path_buf(),
        source,
    })?;
    tracing::info!(
        input = %input.display(),
        output = %output.display(),
        rules = derivation.rules_applied,
        "Teachers template created"
    );
    Ok(derivation)
}
