use axum::{
    Extension, Json,
    extract::{Multipart, State, multipart::Field},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::{
    Error, UserID,
    app_state::DbState,
    import::{parse_file, store_rows},
};

/// The name of the multipart form field that holds the uploaded file.
const FILE_FIELD: &str = "file";

/// The response to a successful import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportResponse {
    /// The name of the uploaded file.
    pub file_name: String,
    /// The number of transactions stored.
    pub imported: usize,
}

/// Route handler for importing transactions from an uploaded CSV or XLSX file.
///
/// The upload is read and parsed before the database is locked. Every row of the file is
/// stored, or none are.
pub async fn import_transactions_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ImportResponse>), Error> {
    let start_time = std::time::Instant::now();
    let mut upload = None;

    while let Some(field) = multipart.next_field().await.map_err(|error| {
        tracing::debug!("Could not read multipart form: {error}");
        Error::MultipartError(error.body_text())
    })? {
        if field.name() == Some(FILE_FIELD) {
            upload = Some(read_file_field(field).await?);
            break;
        }
    }

    let Some((file_name, data)) = upload else {
        return Err(Error::MultipartError(format!(
            "the form has no \"{FILE_FIELD}\" field"
        )));
    };

    let log_failure = |error: &Error| {
        tracing::debug!(
            "Import of '{file_name}' failed after {}ms: {error}",
            start_time.elapsed().as_millis()
        )
    };

    let rows = parse_file(&file_name, &data).inspect_err(log_failure)?;

    let imported = {
        let connection = state.lock()?;
        store_rows(&rows, user_id, &connection).inspect_err(log_failure)?
    };

    tracing::info!(
        "Imported {imported} transactions from '{file_name}' for user {user_id} in {}ms",
        start_time.elapsed().as_millis()
    );

    Ok((
        StatusCode::CREATED,
        Json(ImportResponse {
            file_name,
            imported,
        }),
    ))
}

async fn read_file_field(field: Field<'_>) -> Result<(String, Vec<u8>), Error> {
    let file_name = match field.file_name() {
        Some(file_name) => file_name.to_owned(),
        None => {
            tracing::debug!("Could not get file name from multipart form field: {field:#?}");
            return Err(Error::MultipartError(
                "Could not get file name from multipart form field".to_owned(),
            ));
        }
    };

    let data = match field.bytes().await {
        Ok(data) => data.to_vec(),
        Err(error) => {
            tracing::error!("Could not read data from multipart form field: {error}");
            return Err(Error::MultipartError(
                "Could not read data from multipart form field.".to_owned(),
            ));
        }
    };

    tracing::debug!("Received file '{}' that is {} bytes", file_name, data.len());

    Ok((file_name, data))
}
