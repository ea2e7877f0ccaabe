use crate::errors::AppError;
use crate::models::Product;
use chrono::Utc;
use uuid::Uuid;

/// Upload ceiling for catalog imports.
pub const MAX_CSV_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Sku,
    Title,
    Description,
    Price,
    Currency,
    Stock,
    ImagePath,
}

fn column_of(header: &str) -> Option<Column> {
    let header = header.trim().trim_start_matches('\u{feff}').to_lowercase();
    match header.as_str() {
        "sku" => Some(Column::Sku),
        "title" | "titre" | "nom" | "name" => Some(Column::Title),
        "description" => Some(Column::Description),
        "price" | "prix" => Some(Column::Price),
        "currency" | "devise" => Some(Column::Currency),
        "stock" | "quantite" => Some(Column::Stock),
        "image_path" | "image" => Some(Column::ImagePath),
        _ => None,
    }
}

fn parse_price(raw: &str) -> f64 {
    raw.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite() && *p >= 0.0)
        .unwrap_or(0.0)
}

fn parse_stock(raw: &str) -> i32 {
    raw.trim().parse::<i32>().map(|s| s.max(0)).unwrap_or(0)
}

/// Reads a catalog CSV. Rows without a title are skipped.
pub fn parse_products_csv(
    body: &[u8],
    user_id: Uuid,
    default_currency: &str,
) -> Result<Vec<Product>, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::BadRequest("CSV file is empty".to_string()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body);

    let columns: Vec<Option<Column>> = reader
        .headers()
        .map_err(|err| AppError::BadRequest(format!("Invalid CSV header: {err}")))?
        .iter()
        .map(column_of)
        .collect();

    let mut products = vec![];
    for (line, record) in reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                tracing::debug!(line = line + 2, "Skipping unreadable CSV row: {}", err);
                continue;
            }
        };

        let now = Utc::now();
        let mut product = Product {
            id: Uuid::new_v4(),
            user_id,
            sku: None,
            title: String::new(),
            description: None,
            price: 0.0,
            currency: default_currency.to_string(),
            stock: 0,
            image_path: None,
            created_at: now,
            updated_at: now,
        };

        for (column, value) in columns.iter().zip(record.iter()) {
            let Some(column) = column else { continue };
            let text = (!value.is_empty()).then(|| value.to_string());
            match column {
                Column::Sku => product.sku = text,
                Column::Title => product.title = value.to_string(),
                Column::Description => product.description = text,
                Column::Price => product.price = parse_price(value),
                Column::Currency => {
                    if let Some(currency) = text {
                        product.currency = currency;
                    }
                }
                Column::Stock => product.stock = parse_stock(value),
                Column::ImagePath => product.image_path = text,
            }
        }

        if !product.title.is_empty() {
            products.push(product);
        }
    }

    if products.is_empty() {
        return Err(AppError::BadRequest(
            "No valid products found in CSV".to_string(),
        ));
    }
    Ok(products)
}
