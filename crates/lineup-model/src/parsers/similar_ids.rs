//! Similar-IDs column parsing.

use crate::error::{Result, ViewModelError};
use crate::types::{CellValue, IdToken, RawColumn, SimilarIdsColumn};
use crate::utils::{parse_number_token, split_tokens};

/// Split one similar-IDs cell into tokens.
///
/// Tokens that read as numbers become [`IdToken::Number`], with blank tokens
/// reading as `0`. Everything else stays text. Mixed lists are expected.
pub fn parse_id_list(cell: &str, delimiter: char) -> Vec<IdToken> {
    split_tokens(cell, delimiter)
        .map(|token| match parse_number_token(token) {
            Some(number) => IdToken::Number(number),
            None => IdToken::Text(token.to_string()),
        })
        .collect()
}

/// Parse the similar-IDs column.
///
/// A null cell becomes `[""]`, a placeholder rather than an absence marker.
/// Any other non-string cell fails the parse.
pub(crate) fn parse_similar_ids_column(
    column: &RawColumn,
    row_count: usize,
    delimiter: char,
) -> Result<SimilarIdsColumn> {
    let values = (0..row_count)
        .map(|i| match column.cell(i) {
            CellValue::Null => Ok(vec![IdToken::Text(String::new())]),
            CellValue::Text(cell) => Ok(parse_id_list(cell, delimiter)),
            other => Err(ViewModelError::InvalidSimilarIds {
                column: column.display_name.clone(),
                value: other.to_json(),
            }),
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(SimilarIdsColumn {
        name: column.display_name.clone(),
        values,
    })
}
