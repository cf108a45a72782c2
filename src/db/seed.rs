//! Initial reference data loaded into an empty database.

use crate::models::{AdminData, AdminItem, Role, User, MASTER_USER_ID};

fn item(id: &str, name: &str) -> AdminItem {
    AdminItem {
        id: id.to_string(),
        name: name.to_string(),
        email: None,
    }
}

fn item_with_email(id: &str, name: &str, email: &str) -> AdminItem {
    AdminItem {
        id: id.to_string(),
        name: name.to_string(),
        email: Some(email.to_string()),
    }
}

/// The reference lists and users a fresh installation starts with. Also used
/// as the fallback when a restored snapshot carries no admin data.
pub fn seed_admin_data() -> AdminData {
    AdminData {
        procediments: vec![
            item("p1", "Llicència d'obres menors"),
            item("p2", "Primera Ocupació"),
            item("p3", "Comunicació prèvia tipus 1 Obra Menor"),
            item("p4", "Obres Majors"),
            item("p5", "Ocupació via pública"),
            item("p6", "Agrupació/Segregació de parcel·les/solars"),
            item("p7", "Comunicació prèvia tipus 2 Obra Menor"),
        ],
        sentit_informes: vec![
            item("s1", "Favorable"),
            item("s2", "Desfavorable"),
            item("s3", "Favorable condicionat (mixte)"),
            item("s4", "Posar en consideració"),
            item("s5", "Caducat/Arxivat"),
            item("s6", "Requeriment"),
        ],
        tecnics: vec![
            item_with_email("t1", "Claudia Carvajal", "ccarvajal@tossa.cat"),
            item_with_email("t2", "Cristina Atalaya", "catalaya@tossa.cat"),
            item_with_email("t3", "Gonzalo Alcaraz", "galcaraz@tossa.cat"),
            item_with_email("t4", "Jordi Couso", "jcouso@tossa.cat"),
            item_with_email("t5", "Josep Almató", "jalmato@tossa.cat"),
        ],
        departaments: vec![
            item("d1", "Urbanisme"),
            item("d2", "Medi Ambient"),
            item("d3", "Serveis Jurídics"),
        ],
        regidors: vec![
            item_with_email("r1", "Ramon Gascons", "rgascons@tossa.cat"),
            item_with_email("r2", "Andrea Nadal", "anadal@tossa.cat"),
            item_with_email("r3", "Eva Barnés", "ebarnes@tossa.cat"),
        ],
        users: vec![
            User {
                id: MASTER_USER_ID.to_string(),
                name: "Admin Master".to_string(),
                email: "admin@tossa.cat".to_string(),
                password: Some("masterpassword".to_string()),
                role: Role::Admin,
            },
            User {
                id: "user-1".to_string(),
                name: "Josep Almató".to_string(),
                email: "jalmato@tossa.cat".to_string(),
                password: Some("password123".to_string()),
                role: Role::Editor,
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_contains_master_admin() {
        let data = seed_admin_data();
        let master = data
            .users
            .iter()
            .find(|u| u.id == MASTER_USER_ID)
            .unwrap();
        assert_eq!(master.role, Role::Admin);
        assert!(master.password.is_some());
    }

    #[test]
    fn test_seed_list_sizes() {
        let data = seed_admin_data();
        assert_eq!(data.procediments.len(), 7);
        assert_eq!(data.sentit_informes.len(), 6);
        assert_eq!(data.tecnics.len(), 5);
        assert_eq!(data.departaments.len(), 3);
        assert_eq!(data.regidors.len(), 3);
    }
}
