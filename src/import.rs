use crate::model::InsertStudent;

/// One rejected line from an import batch. `row` is 1-based and counts the
/// header line, matching what the client shows next to the raw file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub row: usize,
    pub message: String,
}

impl RowError {
    fn new(row: usize, message: impl Into<String>) -> Self {
        Self {
            row,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    FirstName,
    LastName,
    Phone,
    Email,
    GuardianName,
}

/// Header cells are matched case-insensitively against both the English
/// export names and the Spanish ones older spreadsheets still carry.
fn column_for_header(cell: &str) -> Option<Column> {
    let key = cell.trim().trim_matches('"').to_lowercase();
    match key.as_str() {
        "firstname" | "first name" | "nombre" => Some(Column::FirstName),
        "lastname" | "last name" | "apellido" | "apellidos" => Some(Column::LastName),
        "phone" | "telefono" | "teléfono" => Some(Column::Phone),
        "email" | "correo" => Some(Column::Email),
        "guardianname" | "guardian name" | "tutor" => Some(Column::GuardianName),
        _ => None,
    }
}

/// Picks the delimiter from the header line when the caller did not name
/// one. Tabs win over semicolons, semicolons over commas.
fn detect_delimiter(header: &str) -> char {
    if header.contains('\t') {
        '\t'
    } else if header.contains(';') {
        ';'
    } else {
        ','
    }
}

fn clean_cell(raw: &str) -> Option<String> {
    let t = raw.trim().trim_matches('"').trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

/// Parses delimited student rows. All-or-nothing: if any row (or the
/// header) is unusable, nothing is returned and every problem is reported
/// with its row number. This route validates before anything is created,
/// unlike the bare bulk-create call which takes its payload as-is.
pub fn parse_students(
    content: &str,
    delimiter: Option<char>,
) -> Result<Vec<InsertStudent>, Vec<RowError>> {
    let mut lines = content
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty());

    let Some((header_idx, header)) = lines.next() else {
        return Err(vec![RowError::new(1, "empty file")]);
    };
    let sep = delimiter.unwrap_or_else(|| detect_delimiter(header));

    let mut columns: Vec<Option<Column>> = Vec::new();
    for cell in header.split(sep) {
        columns.push(column_for_header(cell));
    }
    let has = |c: Column| columns.iter().any(|v| *v == Some(c));
    let mut errors: Vec<RowError> = Vec::new();
    for (col, label) in [
        (Column::FirstName, "firstName/nombre"),
        (Column::LastName, "lastName/apellidos"),
        (Column::Phone, "phone/telefono"),
    ] {
        if !has(col) {
            errors.push(RowError::new(
                header_idx + 1,
                format!("missing required column: {}", label),
            ));
        }
    }
    if !errors.is_empty() {
        return Err(errors);
    }

    let mut students: Vec<InsertStudent> = Vec::new();
    for (idx, line) in lines {
        let row = idx + 1;
        let cells: Vec<Option<String>> = line.split(sep).map(clean_cell).collect();
        let cell = |c: Column| -> Option<String> {
            columns
                .iter()
                .position(|v| *v == Some(c))
                .and_then(|i| cells.get(i).cloned().flatten())
        };

        let first_name = cell(Column::FirstName);
        let last_name = cell(Column::LastName);
        let phone = cell(Column::Phone);

        let mut row_ok = true;
        for (value, label) in [
            (&first_name, "first name"),
            (&last_name, "last name"),
            (&phone, "phone"),
        ] {
            if value.is_none() {
                errors.push(RowError::new(row, format!("missing {}", label)));
                row_ok = false;
            }
        }
        if !row_ok {
            continue;
        }

        students.push(InsertStudent {
            first_name: first_name.unwrap_or_default(),
            last_name: last_name.unwrap_or_default(),
            phone: phone.unwrap_or_default(),
            email: cell(Column::Email),
            guardian_name: cell(Column::GuardianName),
        });
    }

    if errors.is_empty() {
        Ok(students)
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_headers_comma_delimited() {
        let content = "firstName,lastName,phone,email\nAna,Serra,600111222,ana@club.example\nPau,Vila,600333444,\n";
        let students = parse_students(content, None).expect("valid batch");
        assert_eq!(students.len(), 2);
        assert_eq!(students[0].first_name, "Ana");
        assert_eq!(students[0].email.as_deref(), Some("ana@club.example"));
        assert_eq!(students[1].email, None);
    }

    #[test]
    fn spanish_headers_semicolon_delimited() {
        let content = "Nombre;Apellidos;Teléfono;Tutor\nJúlia;Font;611222333;Marta Font\n";
        let students = parse_students(content, None).expect("valid batch");
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].last_name, "Font");
        assert_eq!(students[0].phone, "611222333");
        assert_eq!(students[0].guardian_name.as_deref(), Some("Marta Font"));
    }

    #[test]
    fn tab_wins_delimiter_detection() {
        let content = "firstName\tlastName\tphone\nAna\tSerra\t600111222\n";
        let students = parse_students(content, None).expect("valid batch");
        assert_eq!(students.len(), 1);
    }

    #[test]
    fn one_bad_row_rejects_the_whole_batch() {
        let content = "firstName,lastName,phone\nAna,Serra,600111222\nPau,,600333444\n,Font,\n";
        let errors = parse_students(content, None).expect_err("bad rows");
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0].row, 3);
        assert_eq!(errors[0].message, "missing last name");
        assert_eq!(errors[1].row, 4);
        assert_eq!(errors[2].row, 4);
    }

    #[test]
    fn missing_required_column_is_a_header_error() {
        let content = "firstName,lastName\nAna,Serra\n";
        let errors = parse_students(content, None).expect_err("header error");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].row, 1);
        assert!(errors[0].message.contains("phone"));
    }

    #[test]
    fn empty_content_is_rejected() {
        assert!(parse_students("", None).is_err());
        assert!(parse_students("\n\n", None).is_err());
    }

    #[test]
    fn blank_lines_between_rows_are_skipped() {
        let content = "nombre,apellidos,telefono\n\nAna,Serra,600111222\n\n";
        let students = parse_students(content, None).expect("valid batch");
        assert_eq!(students.len(), 1);
    }
}
