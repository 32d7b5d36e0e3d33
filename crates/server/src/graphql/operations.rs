//! Fixed Stitch GraphQL operations.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

const CLIENT_WEBHOOK_ADD: &str = include_str!("../../graphql/client_webhook_add.graphql");
const LIST_WEBHOOK_ENDPOINTS: &str = include_str!("../../graphql/list_webhook_endpoints.graphql");
const CREATE_PAYMENT_REQUEST_CARD: &str =
    include_str!("../../graphql/create_payment_request_card.graphql");
const CREATE_PAYMENT_REQUEST_BANK: &str =
    include_str!("../../graphql/create_payment_request_bank.graphql");
const CREATE_REFUND: &str = include_str!("../../graphql/create_refund.graphql");

/// Request body sent to the GraphQL endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQlOperation<V> {
    pub query: &'static str,
    pub variables: V,
    pub operation_name: &'static str,
}

/// Stitch `MoneyInput`. `quantity` is forwarded exactly as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Money {
    #[schema(value_type = Object, example = 1)]
    pub quantity: Value,
    #[schema(example = "ZAR")]
    pub currency: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookAddVariables {
    pub url: String,
    pub filter_types: Vec<String>,
}

pub fn client_webhook_add(url: &str, filter_types: &[String]) -> GraphQlOperation<WebhookAddVariables> {
    GraphQlOperation {
        query: CLIENT_WEBHOOK_ADD,
        variables: WebhookAddVariables {
            url: url.to_string(),
            filter_types: filter_types.to_vec(),
        },
        operation_name: "clientWebhookAdd",
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListWebhookEndpointsVariables {
    pub filter: Vec<String>,
}

pub fn list_webhook_endpoints(filter: &[String]) -> GraphQlOperation<ListWebhookEndpointsVariables> {
    GraphQlOperation {
        query: LIST_WEBHOOK_ENDPOINTS,
        variables: ListWebhookEndpointsVariables {
            filter: filter.to_vec(),
        },
        operation_name: "ListWebhookEndpoints",
    }
}

/// Inputs for a payment initiation request.
///
/// Beneficiary fields only apply to bank-account requests (`card == false`).
#[derive(Debug, Clone)]
pub struct PaymentRequest {
    pub amount: Money,
    pub payer_reference: Option<String>,
    pub beneficiary_reference: Option<String>,
    pub external_reference: Option<String>,
    pub beneficiary_name: Option<String>,
    pub beneficiary_bank_id: Option<String>,
    pub beneficiary_account_number: Option<String>,
    pub merchant: Option<String>,
    pub card: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPaymentVariables {
    pub amount: Money,
    pub external_reference: Option<String>,
    pub merchant: Option<String>,
    pub card: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BankPaymentVariables {
    pub amount: Money,
    pub payer_reference: Option<String>,
    pub beneficiary_reference: Option<String>,
    pub external_reference: Option<String>,
    pub beneficiary_name: Option<String>,
    pub beneficiary_bank_id: Option<String>,
    pub beneficiary_account_number: Option<String>,
    pub merchant: Option<String>,
    pub card: bool,
}

/// Variables for whichever `CreatePaymentRequest` document was selected.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PaymentRequestVariables {
    Card(CardPaymentVariables),
    BankAccount(BankPaymentVariables),
}

/// `card` selects the document: card-only, or bank-account beneficiary.
pub fn create_payment_request(request: &PaymentRequest) -> GraphQlOperation<PaymentRequestVariables> {
    let (query, variables) = if request.card {
        (
            CREATE_PAYMENT_REQUEST_CARD,
            PaymentRequestVariables::Card(CardPaymentVariables {
                amount: request.amount.clone(),
                external_reference: request.external_reference.clone(),
                merchant: request.merchant.clone(),
                card: true,
            }),
        )
    } else {
        (
            CREATE_PAYMENT_REQUEST_BANK,
            PaymentRequestVariables::BankAccount(BankPaymentVariables {
                amount: request.amount.clone(),
                payer_reference: request.payer_reference.clone(),
                beneficiary_reference: request.beneficiary_reference.clone(),
                external_reference: request.external_reference.clone(),
                beneficiary_name: request.beneficiary_name.clone(),
                beneficiary_bank_id: request.beneficiary_bank_id.clone(),
                beneficiary_account_number: request.beneficiary_account_number.clone(),
                merchant: request.merchant.clone(),
                card: false,
            }),
        )
    };

    GraphQlOperation {
        query,
        variables,
        operation_name: "CreatePaymentRequest",
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundVariables {
    pub amount: Money,
    pub reason: String,
    pub nonce: String,
    pub beneficiary_reference: String,
    pub payment_request_id: String,
}

pub fn create_refund(
    amount: Money,
    reason: &str,
    nonce: &str,
    beneficiary_reference: &str,
    payment_request_id: &str,
) -> GraphQlOperation<RefundVariables> {
    GraphQlOperation {
        query: CREATE_REFUND,
        variables: RefundVariables {
            amount,
            reason: reason.to_string(),
            nonce: nonce.to_string(),
            beneficiary_reference: beneficiary_reference.to_string(),
            payment_request_id: payment_request_id.to_string(),
        },
        operation_name: "createRefund",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn zar(quantity: Value) -> Money {
        Money {
            quantity,
            currency: "ZAR".into(),
        }
    }

    fn sample_request(card: bool) -> PaymentRequest {
        PaymentRequest {
            amount: zar(json!(1)),
            payer_reference: Some("KombuchaFizz".into()),
            beneficiary_reference: Some("Joe-Fizz-01".into()),
            external_reference: Some("example".into()),
            beneficiary_name: Some("FizzBuzz".into()),
            beneficiary_bank_id: Some("fnb".into()),
            beneficiary_account_number: Some("123456789".into()),
            merchant: Some("Acme Inc".into()),
            card,
        }
    }

    /// The operation name must match the name declared in the document.
    fn declares(op_query: &str, keyword: &str, name: &str) -> bool {
        op_query.contains(&format!("{keyword} {name}("))
    }

    #[test]
    fn webhook_add_serializes_camel_case() {
        let op = client_webhook_add("https://hooks.example", &["payment".to_string()]);
        assert!(declares(op.query, "mutation", op.operation_name));
        let body = serde_json::to_value(&op).unwrap();
        assert_eq!(body["operationName"], "clientWebhookAdd");
        assert_eq!(
            body["variables"],
            json!({"url": "https://hooks.example", "filterTypes": ["payment"]})
        );
    }

    #[test]
    fn list_webhooks_uses_filter_variable() {
        let op = list_webhook_endpoints(&["payment".to_string()]);
        assert!(declares(op.query, "query", op.operation_name));
        let body = serde_json::to_value(&op).unwrap();
        assert_eq!(body["variables"], json!({"filter": ["payment"]}));
    }

    #[test]
    fn card_flag_selects_card_document() {
        let op = create_payment_request(&sample_request(true));
        assert!(declares(op.query, "mutation", op.operation_name));
        assert!(!op.query.contains("bankAccount"));
        let body = serde_json::to_value(&op).unwrap();
        assert_eq!(
            body["variables"],
            json!({
                "amount": {"quantity": 1, "currency": "ZAR"},
                "externalReference": "example",
                "merchant": "Acme Inc",
                "card": true
            })
        );
    }

    #[test]
    fn bank_flag_selects_beneficiary_document() {
        let op = create_payment_request(&sample_request(false));
        assert!(declares(op.query, "mutation", op.operation_name));
        assert!(op.query.contains("bankAccount"));
        let body = serde_json::to_value(&op).unwrap();
        let vars = &body["variables"];
        assert_eq!(vars["card"], false);
        assert_eq!(vars["beneficiaryBankId"], "fnb");
        assert_eq!(vars["beneficiaryAccountNumber"], "123456789");
        assert_eq!(vars["payerReference"], "KombuchaFizz");
    }

    #[test]
    fn missing_optionals_serialize_as_null() {
        let mut request = sample_request(false);
        request.merchant = None;
        let body = serde_json::to_value(create_payment_request(&request)).unwrap();
        assert_eq!(body["variables"]["merchant"], Value::Null);
    }

    #[test]
    fn refund_carries_nonce_and_payment_id() {
        let op = create_refund(zar(json!("10.50")), "alreadyPaid", "nonce-1", "ref", "pr-1");
        assert!(declares(op.query, "mutation", op.operation_name));
        let body = serde_json::to_value(&op).unwrap();
        assert_eq!(body["variables"]["amount"]["quantity"], "10.50");
        assert_eq!(body["variables"]["nonce"], "nonce-1");
        assert_eq!(body["variables"]["paymentRequestId"], "pr-1");
        assert_eq!(body["variables"]["beneficiaryReference"], "ref");
    }
}
