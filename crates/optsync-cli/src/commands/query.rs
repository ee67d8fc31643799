//! Read-only API queries.

use anyhow::{bail, Result};

use optsync_api::{ApiResponse, ApiResult};

use crate::output;

pub async fn status() -> Result<()> {
    let api = super::connect().await?;
    show("Status", api.status().await)
}

pub async fn terms() -> Result<()> {
    let api = super::connect().await?;
    show("Term list", api.term_list().await)
}

pub async fn adoptions(term: &str) -> Result<()> {
    let api = super::connect().await?;
    show("Adoption list", api.list_adoptions(term).await)
}

fn show(what: &str, response: ApiResult<ApiResponse>) -> Result<()> {
    let response = response?;

    if let Some(error) = &response.error {
        bail!("{} request failed: {} - {}", what, response.status, error);
    }

    output::print_json(response.data.as_ref())
}
