use crate::{crawler::nse::Nse, error::Result};

/// 下載所有上市股票的 CSV，解析交由 `database::table::stock` 處理
pub(super) async fn visit(nse: &Nse) -> Result<Vec<u8>> {
    let csv = nse.http.get_bytes(&nse.catalog_url).await?;
    nse.logger.debug(format!(
        "downloaded {} bytes of security catalog from {}",
        csv.len(),
        nse.catalog_url
    ));

    Ok(csv)
}
