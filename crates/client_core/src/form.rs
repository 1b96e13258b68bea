use std::fmt;

use shared::{
    domain::Gender,
    protocol::{Contact, ContactPatch, NewContact},
};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Name,
    BirthDate,
    Gender,
}

impl FormField {
    pub const ALL: [FormField; 3] = [FormField::Name, FormField::BirthDate, FormField::Gender];

    pub fn as_str(self) -> &'static str {
        match self {
            FormField::Name => "nome",
            FormField::BirthDate => "data_nascimento",
            FormField::Gender => "sexo",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("missing required fields: {}", join_fields(.0))]
    MissingFields(Vec<FormField>),
}

fn join_fields(fields: &[FormField]) -> String {
    fields
        .iter()
        .map(|field| field.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Raw field values as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub name: String,
    pub birth_date: String,
    pub gender: String,
}

impl ContactForm {
    pub fn from_contact(contact: &Contact) -> Self {
        Self {
            name: contact.name.clone(),
            birth_date: contact.birth_date.clone(),
            gender: contact.gender.to_string(),
        }
    }

    pub fn field(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::BirthDate => &self.birth_date,
            FormField::Gender => &self.gender,
        }
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        match field {
            FormField::Name => self.name = value,
            FormField::BirthDate => self.birth_date = value,
            FormField::Gender => self.gender = value,
        }
    }

    pub fn is_blank(&self) -> bool {
        FormField::ALL
            .into_iter()
            .all(|field| self.field(field).trim().is_empty())
    }

    pub fn missing_fields(&self) -> Vec<FormField> {
        FormField::ALL
            .into_iter()
            .filter(|field| self.field(*field).trim().is_empty())
            .collect()
    }

    /// Required-field check only; dates are not format-checked here.
    pub fn validate(&self) -> Result<NewContact, FormError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(FormError::MissingFields(missing));
        }
        Ok(NewContact {
            name: self.name.trim().to_string(),
            birth_date: self.birth_date.trim().to_string(),
            gender: Gender::from(self.gender.trim().to_string()),
        })
    }

    /// Update body: every non-blank field.
    pub fn to_patch(&self) -> ContactPatch {
        let present = |value: &str| {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        };
        ContactPatch {
            name: present(&self.name),
            birth_date: present(&self.birth_date),
            gender: present(&self.gender).map(Gender::from),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FormMode {
    #[default]
    Idle,
    Creating,
    Editing {
        selected: Contact,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    mode: FormMode,
    values: ContactForm,
}

impl FormState {
    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn values(&self) -> &ContactForm {
        &self.values
    }

    pub fn selected(&self) -> Option<&Contact> {
        match &self.mode {
            FormMode::Editing { selected } => Some(selected),
            _ => None,
        }
    }

    /// Opens a blank form for a new contact.
    pub fn start_create(&mut self) {
        self.mode = FormMode::Creating;
        self.values = ContactForm::default();
    }

    /// Opens the form pre-filled from a freshly fetched record.
    pub fn begin_edit(&mut self, contact: Contact) {
        self.values = ContactForm::from_contact(&contact);
        self.mode = FormMode::Editing { selected: contact };
    }

    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) {
        self.values.set(field, value);
    }

    pub fn set_values(&mut self, values: ContactForm) {
        self.values = values;
    }

    /// Back to the list with an empty buffer.
    pub fn reset(&mut self) {
        self.mode = FormMode::Idle;
        self.values = ContactForm::default();
    }
}
