// Barcode registry lookup and registration
//
// The registry maps a product barcode to bottle metadata so a scan can
// prefill the add-bottle flow. Decoding the barcode from an image is the
// scanner's job, not ours; only the lookup/register HTTP surface lives here.

use serde::{Deserialize, Serialize};

use crate::config::Endpoints;
use crate::error::ClientError;
use crate::http_client::ApiClient;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarcodeRegistryData {
    pub id: u64,
    pub barcode: String,
    pub name: String,
    pub brand: Option<String>,
    pub flavor_profile: Option<String>,
    pub capacity_ml: Option<u32>,
    pub spirit_type_name: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BarcodeLookupResponse {
    pub found: bool,
    pub data: Option<BarcodeRegistryData>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BarcodeRegisterRequest {
    pub barcode: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flavor_profile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity_ml: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spirit_type_name: Option<String>,
}

/// Look up a barcode in the global registry.
pub async fn lookup_barcode(
    client: &ApiClient,
    endpoints: &Endpoints,
    barcode: &str,
) -> Result<BarcodeLookupResponse, ClientError> {
    let barcode = validate_barcode(barcode)?;
    client.get_json(&endpoints.barcode_lookup(barcode)).await
}

/// Register a barcode with bottle information.
pub async fn register_barcode(
    client: &ApiClient,
    endpoints: &Endpoints,
    request: &BarcodeRegisterRequest,
) -> Result<BarcodeRegistryData, ClientError> {
    validate_barcode(&request.barcode)?;
    client.post_json(&endpoints.barcode_register(), request).await
}

/// Barcodes are numeric strings (EAN-8 through EAN/UPC-13 plus a little
/// slack for odd in-store codes).
fn validate_barcode(barcode: &str) -> Result<&str, ClientError> {
    let barcode = barcode.trim();
    if barcode.is_empty() || !barcode.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ClientError::InvalidInput(format!(
            "not a numeric barcode: '{}'",
            barcode
        )));
    }
    Ok(barcode)
}
