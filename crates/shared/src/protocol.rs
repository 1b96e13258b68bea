use serde::{Deserialize, Serialize};

use crate::domain::{ContactId, Gender};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    #[serde(rename = "nome")]
    pub name: String,
    /// ISO date string, e.g. `1990-04-21`.
    #[serde(rename = "data_nascimento")]
    pub birth_date: String,
    #[serde(rename = "sexo")]
    pub gender: Gender,
}

/// Create body: a contact before the backend has assigned its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContact {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "data_nascimento")]
    pub birth_date: String,
    #[serde(rename = "sexo")]
    pub gender: Gender,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactPatch {
    #[serde(rename = "nome", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        rename = "data_nascimento",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub birth_date: Option<String>,
    #[serde(rename = "sexo", default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn contact_uses_backend_field_names() {
        let contact: Contact = serde_json::from_value(json!({
            "id": 3,
            "nome": "Ana",
            "data_nascimento": "1990-04-21",
            "sexo": "Feminino"
        }))
        .expect("contact");
        assert_eq!(contact.id, ContactId(3));
        assert_eq!(contact.gender, Gender::Feminino);

        let value = serde_json::to_value(&contact).expect("serialize");
        assert_eq!(value["data_nascimento"], "1990-04-21");
    }

    #[test]
    fn patch_omits_absent_fields() {
        let patch = ContactPatch {
            name: Some("Bruno".into()),
            ..ContactPatch::default()
        };
        assert_eq!(
            serde_json::to_value(&patch).expect("serialize"),
            json!({ "nome": "Bruno" })
        );
        assert_eq!(
            serde_json::to_value(ContactPatch::default()).expect("serialize"),
            json!({})
        );
    }

    #[test]
    fn new_contact_serializes_without_id() {
        let value = serde_json::to_value(NewContact {
            name: "Ana".into(),
            birth_date: "1990-04-21".into(),
            gender: Gender::Feminino,
        })
        .expect("serialize");
        assert!(value.get("id").is_none());
        assert_eq!(value["sexo"], "Feminino");
    }
}
