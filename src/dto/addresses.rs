use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{error::FieldError, models::ShippingAddress};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateShippingAddressRequest {
    pub recipient_name: String,
    pub street: String,
    pub number: String,
    pub complement: Option<String>,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub cpf_or_cnpj: String,
    pub email: String,
    pub phone: String,
}

/// Address fields that passed validation, ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShippingAddress {
    pub recipient_name: String,
    pub street: String,
    pub number: String,
    pub complement: Option<String>,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub cpf_or_cnpj: String,
    pub email: String,
    pub phone: String,
}

const ZIP_CODE_LEN: (usize, usize) = (8, 9);
const CPF_OR_CNPJ_LEN: (usize, usize) = (11, 14);
const PHONE_MIN_LEN: usize = 10;

impl CreateShippingAddressRequest {
    /// Check every field and report all failures at once.
    pub fn validate(self) -> Result<NewShippingAddress, Vec<FieldError>> {
        let mut errors = Vec::new();

        for (field, value) in [
            ("recipient_name", &self.recipient_name),
            ("street", &self.street),
            ("number", &self.number),
            ("neighborhood", &self.neighborhood),
            ("city", &self.city),
            ("state", &self.state),
            ("country", &self.country),
        ] {
            if value.trim().is_empty() {
                errors.push(FieldError::new(field, format!("{field} is required")));
            }
        }

        check_length(&mut errors, "zip_code", &self.zip_code, ZIP_CODE_LEN);
        check_length(&mut errors, "cpf_or_cnpj", &self.cpf_or_cnpj, CPF_OR_CNPJ_LEN);

        if !looks_like_email(&self.email) {
            errors.push(FieldError::new("email", "email is invalid"));
        }
        if self.phone.chars().count() < PHONE_MIN_LEN {
            errors.push(FieldError::new(
                "phone",
                format!("phone must have at least {PHONE_MIN_LEN} characters"),
            ));
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let complement = self.complement.filter(|c| !c.trim().is_empty());
        Ok(NewShippingAddress {
            recipient_name: self.recipient_name,
            street: self.street,
            number: self.number,
            complement,
            neighborhood: self.neighborhood,
            city: self.city,
            state: self.state,
            zip_code: self.zip_code,
            country: self.country,
            cpf_or_cnpj: self.cpf_or_cnpj,
            email: self.email,
            phone: self.phone,
        })
    }
}

fn check_length(
    errors: &mut Vec<FieldError>,
    field: &'static str,
    value: &str,
    (min, max): (usize, usize),
) {
    let len = value.chars().count();
    if len < min || len > max {
        errors.push(FieldError::new(
            field,
            format!("{field} must have between {min} and {max} characters"),
        ));
    }
}

fn looks_like_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ShippingAddressList {
    #[schema(value_type = Vec<ShippingAddress>)]
    pub items: Vec<ShippingAddress>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> CreateShippingAddressRequest {
        CreateShippingAddressRequest {
            recipient_name: "Maria Souza".into(),
            street: "Rua das Flores".into(),
            number: "42".into(),
            complement: Some("Apto 7".into()),
            neighborhood: "Centro".into(),
            city: "Belo Horizonte".into(),
            state: "MG".into(),
            zip_code: "30110-012".into(),
            country: "Brasil".into(),
            cpf_or_cnpj: "123.456.789-09".into(),
            email: "maria@example.com".into(),
            phone: "31987654321".into(),
        }
    }

    fn failed_fields(request: CreateShippingAddressRequest) -> Vec<&'static str> {
        request
            .validate()
            .unwrap_err()
            .into_iter()
            .map(|e| e.field)
            .collect()
    }

    #[test]
    fn accepts_a_complete_address() {
        let address = valid_request().validate().expect("valid address");
        assert_eq!(address.complement.as_deref(), Some("Apto 7"));
    }

    #[test]
    fn blank_complement_becomes_none() {
        let mut request = valid_request();
        request.complement = Some("   ".into());
        assert_eq!(request.validate().expect("valid").complement, None);
    }

    #[test]
    fn zip_code_bounds() {
        for (zip, ok) in [
            ("3011001", false),
            ("30110012", true),
            ("30110-012", true),
            ("30110-0123", false),
        ] {
            let mut request = valid_request();
            request.zip_code = zip.into();
            assert_eq!(request.validate().is_ok(), ok, "zip {zip}");
        }
    }

    #[test]
    fn cpf_or_cnpj_bounds() {
        for (doc, ok) in [
            ("1234567890", false),
            ("12345678909", true),
            ("12345678000195", true),
            ("12.345.678/0001-95", false),
        ] {
            let mut request = valid_request();
            request.cpf_or_cnpj = doc.into();
            assert_eq!(request.validate().is_ok(), ok, "document {doc}");
        }
    }

    #[test]
    fn reports_every_failing_field() {
        let mut request = valid_request();
        request.recipient_name = " ".into();
        request.city = String::new();
        request.zip_code = "123".into();
        request.email = "not-an-email".into();
        request.phone = "12345".into();

        assert_eq!(
            failed_fields(request),
            vec!["recipient_name", "city", "zip_code", "email", "phone"]
        );
    }

    #[test]
    fn email_shape() {
        assert!(looks_like_email("a@b.co"));
        assert!(!looks_like_email("a@b"));
        assert!(!looks_like_email("@b.co"));
        assert!(!looks_like_email("a@@b.co"));
        assert!(!looks_like_email("a b@c.co"));
    }
}
