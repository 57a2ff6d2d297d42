//! Shortage Sheet Reader
//!
//! Turns uploaded spreadsheet bytes into [`RawRow`]s for the normalizer.
//! Supports CSV, Excel (XLSX/XLS) and XML row exports.

use anyhow::{anyhow, Context, Result};
use bomai_models::{CellValue, RawRow};
use calamine::{DataType, Reader, Xls, Xlsx};
use std::io::Cursor;
use std::path::Path;

/// Supported sheet formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    Csv,
    Xlsx,
    Xls,
    Xml,
}

impl SheetFormat {
    /// Detect format from file extension
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" | "xlsm" => Some(Self::Xlsx),
            "xls" => Some(Self::Xls),
            "xml" => Some(Self::Xml),
            _ => None,
        }
    }

    /// Detect format from content type header
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        match content_type {
            "text/csv" | "application/csv" => Some(Self::Csv),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => Some(Self::Xlsx),
            "application/vnd.ms-excel" => Some(Self::Xls),
            "application/xml" | "text/xml" => Some(Self::Xml),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Xlsx => "XLSX",
            Self::Xls => "XLS",
            Self::Xml => "XML",
        }
    }
}

/// Rows read from one sheet
#[derive(Debug, Clone)]
pub struct ParsedSheet {
    pub filename: String,
    pub format: SheetFormat,
    pub column_headers: Vec<String>,
    pub rows: Vec<RawRow>,
    pub parse_warnings: Vec<String>,
}

/// XML element names that delimit one row
const XML_ROW_ELEMENTS: [&str; 5] = ["row", "item", "component", "entry", "record"];

#[derive(Debug, Clone, Copy, Default)]
pub struct SheetReader;

impl SheetReader {
    pub fn new() -> Self {
        Self
    }

    /// Read a sheet. An explicit format wins over the file extension, which
    /// wins over the content type.
    pub fn read_bytes(
        &self,
        filename: &str,
        content_type: Option<&str>,
        data: &[u8],
        format: Option<SheetFormat>,
    ) -> Result<ParsedSheet> {
        let format = format
            .or_else(|| SheetFormat::from_extension(Path::new(filename)))
            .or_else(|| content_type.and_then(SheetFormat::from_content_type))
            .context("Could not determine spreadsheet format")?;

        match format {
            SheetFormat::Csv => self.read_csv(filename, data),
            SheetFormat::Xlsx => self.read_workbook::<Xlsx<Cursor<&[u8]>>>(filename, data, format),
            SheetFormat::Xls => self.read_workbook::<Xls<Cursor<&[u8]>>>(filename, data, format),
            SheetFormat::Xml => self.read_xml(filename, data),
        }
    }

    fn read_csv(&self, filename: &str, data: &[u8]) -> Result<ParsedSheet> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .has_headers(false)
            .from_reader(data);

        let mut warnings = Vec::new();
        let mut headers: Option<Vec<String>> = None;
        let mut rows = Vec::new();

        for (idx, result) in reader.records().enumerate() {
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    warnings.push(format!("Row {}: Parse error - {}", idx + 1, e));
                    continue;
                }
            };
            let cells: Vec<CellValue> = record.iter().map(text_cell).collect();

            if let Some(names) = &headers {
                if let Some(row) = build_row(names, cells) {
                    rows.push(row);
                }
            } else if !is_blank_line(&cells) {
                headers = Some(header_names(&cells));
            }
        }

        let column_headers = headers.context("Empty CSV file")?;

        Ok(ParsedSheet {
            filename: filename.to_string(),
            format: SheetFormat::Csv,
            column_headers,
            rows,
            parse_warnings: warnings,
        })
    }

    fn read_workbook<'a, R>(&self, filename: &str, data: &'a [u8], format: SheetFormat) -> Result<ParsedSheet>
    where
        R: Reader<Cursor<&'a [u8]>>,
    {
        let mut workbook = R::new(Cursor::new(data))
            .map_err(|e| anyhow!("Failed to open workbook: {:?}", e))?;

        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .context("No sheets found in workbook")?;

        let range = workbook
            .worksheet_range(&sheet_name)
            .context("Failed to read worksheet")?
            .map_err(|e| anyhow!("Failed to read worksheet {}: {:?}", sheet_name, e))?;

        let mut headers: Option<Vec<String>> = None;
        let mut rows = Vec::new();

        for row in range.rows() {
            let cells: Vec<CellValue> = row.iter().map(workbook_cell).collect();

            if let Some(names) = &headers {
                if let Some(parsed) = build_row(names, cells) {
                    rows.push(parsed);
                }
            } else if !is_blank_line(&cells) {
                headers = Some(header_names(&cells));
            }
        }

        let column_headers = headers.context("Empty worksheet")?;

        Ok(ParsedSheet {
            filename: filename.to_string(),
            format,
            column_headers,
            rows,
            parse_warnings: Vec::new(),
        })
    }

    fn read_xml(&self, filename: &str, data: &[u8]) -> Result<ParsedSheet> {
        use quick_xml::events::Event;
        use quick_xml::Reader;

        let mut reader = Reader::from_reader(data);
        reader.trim_text(true);

        let mut rows = Vec::new();
        let mut warnings = Vec::new();
        let mut column_headers: Vec<String> = Vec::new();
        let mut current_row: Option<RawRow> = None;
        let mut current_element = String::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    let tag_name = String::from_utf8_lossy(e.name().as_ref()).to_string();

                    if XML_ROW_ELEMENTS.contains(&tag_name.to_lowercase().as_str()) {
                        current_row = Some(RawRow::new());
                    } else if current_row.is_some() {
                        current_element = tag_name.replace('_', " ");
                    }
                }
                Ok(Event::Text(e)) => {
                    if let Some(ref mut row) = current_row {
                        if !current_element.is_empty() {
                            let text = e.unescape().unwrap_or_default().to_string();
                            if !column_headers.contains(&current_element) {
                                column_headers.push(current_element.clone());
                            }
                            row.insert(current_element.clone(), text_cell(&text));
                        }
                    }
                }
                Ok(Event::End(ref e)) => {
                    let tag_name = String::from_utf8_lossy(e.name().as_ref()).to_string();

                    if XML_ROW_ELEMENTS.contains(&tag_name.to_lowercase().as_str()) {
                        if let Some(row) = current_row.take() {
                            if !row.is_empty() {
                                rows.push(row);
                            }
                        }
                    }
                    current_element.clear();
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    warnings.push(format!("XML parse error: {}", e));
                    break;
                }
                _ => {}
            }
            buf.clear();
        }

        Ok(ParsedSheet {
            filename: filename.to_string(),
            format: SheetFormat::Xml,
            column_headers,
            rows,
            parse_warnings: warnings,
        })
    }
}

fn text_cell(value: &str) -> CellValue {
    if value.trim().is_empty() {
        CellValue::Blank
    } else {
        CellValue::Text(value.trim().to_string())
    }
}

fn workbook_cell(cell: &DataType) -> CellValue {
    match cell {
        DataType::Empty => CellValue::Blank,
        DataType::Int(value) => CellValue::Number(*value as f64),
        DataType::Float(value) => CellValue::Number(*value),
        DataType::String(value) => text_cell(value),
        other => text_cell(&other.to_string()),
    }
}

fn is_blank_line(cells: &[CellValue]) -> bool {
    cells.iter().all(CellValue::is_blank)
}

/// Header texts; unnamed columns get a positional name
fn header_names(cells: &[CellValue]) -> Vec<String> {
    cells
        .iter()
        .enumerate()
        .map(|(idx, cell)| cell.as_text().unwrap_or_else(|| format!("Column {}", idx + 1)))
        .collect()
}

/// Zip a data line with the headers; fully blank lines yield nothing
fn build_row(headers: &[String], cells: Vec<CellValue>) -> Option<RawRow> {
    if is_blank_line(&cells) {
        return None;
    }

    Some(headers.iter().cloned().zip(cells).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(SheetFormat::from_extension(Path::new("shortage.csv")), Some(SheetFormat::Csv));
        assert_eq!(SheetFormat::from_extension(Path::new("Shortage.XLSX")), Some(SheetFormat::Xlsx));
        assert_eq!(SheetFormat::from_extension(Path::new("legacy.xls")), Some(SheetFormat::Xls));
        assert_eq!(SheetFormat::from_extension(Path::new("costing.pdf")), None);
        assert_eq!(SheetFormat::from_content_type("text/csv"), Some(SheetFormat::Csv));
    }

    #[test]
    fn test_csv_rows_skip_leading_and_blank_lines() {
        let csv_data = b",,,\nDescription,Qty Required,Free Stock,Lead Time (Days)\nBolt,10,4,7\n,,,\nNut,3,5,\n";

        let sheet = SheetReader::new().read_bytes("shortage.csv", None, csv_data, None).unwrap();

        assert_eq!(sheet.column_headers[3], "Lead Time (Days)");
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0].get("Description"), Some(&CellValue::from("Bolt")));
        assert_eq!(sheet.rows[1].get("Lead Time (Days)"), Some(&CellValue::Blank));
    }

    #[test]
    fn test_csv_repeated_header_keeps_both_cells() {
        let csv_data = b"Zeta,Description,Qty Required,Free Stock,Qty Required\nz,Bolt,10,4,\n";
        let sheet = SheetReader::new().read_bytes("shortage.csv", None, csv_data, None).unwrap();
        let row = &sheet.rows[0];

        assert_eq!(
            row.columns().collect::<Vec<_>>(),
            vec!["Zeta", "Description", "Qty Required", "Free Stock", "Qty Required"]
        );
        assert_eq!(row.find("Qty Required"), Some(&CellValue::from("10")));
    }

    #[test]
    fn test_content_type_used_for_unknown_extension() {
        let csv_data = b"Part,Qty\nGland,2\n";
        let sheet = SheetReader::new()
            .read_bytes("upload.bin", Some("text/csv"), csv_data, None)
            .unwrap();

        assert_eq!(sheet.format, SheetFormat::Csv);
        assert_eq!(sheet.rows.len(), 1);
    }

    #[test]
    fn test_extension_wins_over_content_type() {
        let csv_data = b"Part,Qty\nGland,2\n";
        let sheet = SheetReader::new()
            .read_bytes("parts.csv", Some("application/vnd.ms-excel"), csv_data, None)
            .unwrap();

        assert_eq!(sheet.format, SheetFormat::Csv);
    }

    #[test]
    fn test_unknown_format_is_an_error() {
        assert!(SheetReader::new().read_bytes("notes.txt", None, b"hello", None).is_err());
    }

    #[test]
    fn test_xml_rows() {
        let xml = br#"<shortages>
            <row><Description>Bolt</Description><Required>10</Required><Free_Stock>4</Free_Stock></row>
            <row><Description>Nut</Description><Required>3</Required></row>
        </shortages>"#;

        let sheet = SheetReader::new().read_bytes("shortage.xml", None, xml, None).unwrap();

        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0].get("Free Stock"), Some(&CellValue::from("4")));
        assert!(sheet.column_headers.contains(&"Required".to_string()));
    }

    #[test]
    fn test_xlsx_rows_with_numeric_cells() {
        let data = include_bytes!("../../tests/fixtures/shortage.xlsx");
        let sheet = SheetReader::new().read_bytes("shortage.xlsx", None, data, None).unwrap();

        assert_eq!(sheet.format, SheetFormat::Xlsx);
        assert_eq!(
            sheet.column_headers,
            vec!["Description", "Qty Required", "Free Stock", "Lead Time (Days)"]
        );
        assert_eq!(sheet.rows.len(), 2);

        let bolt = &sheet.rows[0];
        assert_eq!(bolt.get("Description"), Some(&CellValue::from("Bolt M6 x 20")));
        assert_eq!(bolt.get("Qty Required"), Some(&CellValue::Number(10.0)));
        assert_eq!(bolt.get("Lead Time (Days)"), Some(&CellValue::Number(7.0)));
        assert_eq!(sheet.rows[1].get("Free Stock"), Some(&CellValue::Number(0.0)));
    }

    #[test]
    fn test_invalid_workbook_is_an_error() {
        let result = SheetReader::new().read_bytes("shortage.xlsx", None, b"not a zip", None);
        assert!(result.is_err());
    }
}
