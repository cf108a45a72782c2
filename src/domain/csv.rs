//! Minimal CSV codec for the user roster export/import.
//!
//! RFC 4180 quoting: fields containing commas, quotes or newlines are wrapped
//! in double quotes with inner quotes doubled. Passwords never travel through
//! CSV in either direction.

use crate::errors::AppError;
use crate::models::{Role, User};

pub const USER_CSV_HEADER: &str = "id,name,email,role";

/// Serialize users to CSV, omitting passwords.
pub fn users_to_csv(users: &[User]) -> String {
    let mut out = String::from(USER_CSV_HEADER);
    out.push('\n');
    for user in users {
        out.push_str(&escape(&user.id));
        out.push(',');
        out.push_str(&escape(&user.name));
        out.push(',');
        out.push_str(&escape(&user.email));
        out.push(',');
        out.push_str(user.role.as_str());
        out.push('\n');
    }
    out
}

/// Parse a user CSV document. The header row is mandatory; rows missing any
/// of id, name or email are dropped, and unknown roles fall back to viewer.
pub fn users_from_csv(input: &str) -> Result<Vec<User>, AppError> {
    let mut lines = input.lines();
    let header = lines
        .next()
        .map(|l| l.trim_end_matches('\r').trim())
        .unwrap_or("");
    if !header.eq_ignore_ascii_case(USER_CSV_HEADER) {
        return Err(AppError::Validation(format!(
            "invalid CSV header, expected '{USER_CSV_HEADER}'"
        )));
    }

    let mut users = Vec::new();
    for line in lines {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let fields = split_line(line);
        let id = fields.first().map(|s| s.trim()).unwrap_or("");
        let name = fields.get(1).map(|s| s.trim()).unwrap_or("");
        let email = fields.get(2).map(|s| s.trim()).unwrap_or("");
        if id.is_empty() || name.is_empty() || email.is_empty() {
            continue;
        }
        let role = Role::parse_or_viewer(fields.get(3).map(|s| s.trim()).unwrap_or(""));
        users.push(User {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            password: None,
            role,
        });
    }
    Ok(users)
}

fn escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn split_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}
