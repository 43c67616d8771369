// ==========================================
// IT 资产台账系统 - 文件解析器实现
// ==========================================
// 职责: 上传内容 → 原始行（表头为第 1 行）
// 支持: Excel (.xlsx/.xls/.xlsb) / OpenDocument (.ods) / CSV (.csv)
// 说明: 完全空白的行保留下来，由空行过滤阶段计入 skippedEmptyRows
// ==========================================

use crate::domain::import::{CellValue, RawImportRow};
use crate::importer::asset_importer_trait::FileParser;
use crate::importer::data_cleaner::excel_serial_to_datetime;
use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use csv::{ByteRecord, ReaderBuilder};
use std::io::Cursor;

/// ZIP 容器（xlsx / xlsb / ods）
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
/// OLE2 复合文档（xls / 加密的 OOXML）
const CFB_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "xlsb", "ods"];

/// 文件扩展名（小写）
fn extension_of(file_name: Option<&str>) -> Option<String> {
    let name = file_name?.trim();
    let (_, ext) = name.rsplit_once('.')?;
    Some(ext.to_lowercase())
}

/// 加密的 OOXML 工作簿以 CFB 容器保存，内含 "EncryptionInfo" 流（UTF-16LE 目录项）
pub fn is_encrypted_workbook(bytes: &[u8]) -> bool {
    if !bytes.starts_with(CFB_MAGIC) {
        return false;
    }
    let needle: Vec<u8> = "EncryptionInfo"
        .encode_utf16()
        .flat_map(|u| u.to_le_bytes())
        .collect();
    bytes.windows(needle.len()).any(|w| w == needle.as_slice())
}

fn header_text(cell: &CellValue) -> String {
    cell.as_text().unwrap_or_default()
}

/// 将表头与数据行组装为原始行；行号 = 表头行号 + 偏移
fn assemble_rows(
    headers: &[String],
    header_row_number: usize,
    data_rows: Vec<Vec<CellValue>>,
) -> Vec<RawImportRow> {
    data_rows
        .into_iter()
        .enumerate()
        .map(|(idx, values)| {
            let mut values = values.into_iter();
            let cells = headers
                .iter()
                .map(|h| (h.clone(), values.next().unwrap_or(CellValue::Empty)))
                .collect();
            RawImportRow {
                row_number: header_row_number + idx + 1,
                cells,
            }
        })
        .collect()
}

/// 行数上限检查（在转换单元格之前调用）
fn check_row_limit(actual: usize, max_rows: usize) -> ImportResult<()> {
    if actual > max_rows {
        return Err(ImportError::TooManyRows {
            actual,
            max: max_rows,
        });
    }
    Ok(())
}

/// 逐个逻辑行扫描 CSV 内容，返回表头之后每一行是否为空行
///
/// 与 csv 读取器的切分规则一致: 引号只在字段开头生效，引号内的换行不分行；
/// 只含 `\r` 的行视为空行。表头之前的空行不计入
fn blank_line_layout(content: &[u8]) -> Vec<bool> {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum State {
        FieldStart,
        Unquoted,
        Quoted,
        QuoteInQuoted,
    }

    let mut layout = Vec::new();
    let mut state = State::FieldStart;
    let mut blank = true;
    let mut seen_header = false;

    for &byte in content {
        if byte == b'\n' && state != State::Quoted {
            if seen_header {
                layout.push(blank);
            } else if !blank {
                seen_header = true;
            }
            state = State::FieldStart;
            blank = true;
            continue;
        }
        if byte != b'\r' {
            blank = false;
        }
        state = match (state, byte) {
            (State::Quoted, b'"') => State::QuoteInQuoted,
            (State::Quoted, _) => State::Quoted,
            (State::QuoteInQuoted, b'"') => State::Quoted,
            (State::FieldStart, b'"') => State::Quoted,
            (_, b',') => State::FieldStart,
            _ => State::Unquoted,
        };
    }

    // 末行没有换行符
    if seen_header && !blank {
        layout.push(false);
    }
    layout
}

// ==========================================
// CSV Parser 实现
// ==========================================
// csv 读取器会跳过完全空白的行；按逻辑行布局补回空行，
// 使其与工作表中的空行一样计入总行数
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_bytes(
        &self,
        bytes: &[u8],
        _file_name: Option<&str>,
        max_rows: usize,
    ) -> ImportResult<Vec<RawImportRow>> {
        let content = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(content);

        // 读取表头
        let headers: Vec<String> = reader
            .byte_headers()?
            .iter()
            .map(|h| String::from_utf8_lossy(h).trim().to_string())
            .collect();

        // 先收集原始记录（None 表示空行），不转换单元格
        let mut records = reader.byte_records();
        let mut lines: Vec<Option<ByteRecord>> = Vec::new();
        for is_blank in blank_line_layout(content) {
            if is_blank {
                lines.push(None);
                continue;
            }
            match records.next() {
                Some(record) => lines.push(Some(record?)),
                None => break,
            }
        }
        for record in records {
            lines.push(Some(record?));
        }

        check_row_limit(lines.len(), max_rows)?;

        // CSV 单元格一律按文本处理
        let data_rows = lines
            .into_iter()
            .map(|line| match line {
                None => Vec::new(),
                Some(record) => record
                    .iter()
                    .map(|v| CellValue::Text(String::from_utf8_lossy(v).into_owned()))
                    .collect(),
            })
            .collect();

        Ok(assemble_rows(&headers, 1, data_rows))
    }
}

// ==========================================
// Excel Parser 实现（读取第一个工作表）
// ==========================================
pub struct ExcelParser;

impl ExcelParser {
    fn convert_cell(cell: &Data) -> CellValue {
        match cell {
            Data::Empty | Data::Error(_) => CellValue::Empty,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Float(f) => CellValue::Number(*f),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::DateTime(dt) => {
                let serial = dt.as_f64();
                excel_serial_to_datetime(serial)
                    .map(CellValue::Date)
                    .unwrap_or(CellValue::Number(serial))
            }
            Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        }
    }
}

impl FileParser for ExcelParser {
    fn parse_bytes(
        &self,
        bytes: &[u8],
        _file_name: Option<&str>,
        max_rows: usize,
    ) -> ImportResult<Vec<RawImportRow>> {
        if is_encrypted_workbook(bytes) {
            return Err(ImportError::PasswordProtected);
        }

        // 按内容识别格式（xls / xlsx / xlsb / ods）
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

        let sheet_names = workbook.sheet_names();
        let Some(sheet_name) = sheet_names.first().cloned() else {
            return Err(ImportError::EmptySheet);
        };

        let range = workbook.worksheet_range(&sheet_name)?;
        if range.is_empty() {
            return Ok(Vec::new());
        }

        // 数据行数 = 区域高度 - 表头行
        check_row_limit(range.height().saturating_sub(1), max_rows)?;

        // 提取表头（区域首行）
        let header_row_number = range.start().map(|(row, _)| row as usize + 1).unwrap_or(1);
        let mut rows = range.rows();
        let Some(header_row) = rows.next() else {
            return Ok(Vec::new());
        };
        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| header_text(&Self::convert_cell(cell)))
            .collect();

        let data_rows = rows
            .map(|row| row.iter().map(Self::convert_cell).collect())
            .collect();

        Ok(assemble_rows(&headers, header_row_number, data_rows))
    }
}

// ==========================================
// 通用文件解析器（按内容 + 扩展名选择）
// ==========================================
pub struct UniversalFileParser;

impl FileParser for UniversalFileParser {
    fn parse_bytes(
        &self,
        bytes: &[u8],
        file_name: Option<&str>,
        max_rows: usize,
    ) -> ImportResult<Vec<RawImportRow>> {
        if bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(CFB_MAGIC) {
            return ExcelParser.parse_bytes(bytes, file_name, max_rows);
        }

        match extension_of(file_name).as_deref() {
            None | Some("csv") | Some("txt") => {
                CsvParser.parse_bytes(bytes, file_name, max_rows)
            }
            Some(ext) if SPREADSHEET_EXTENSIONS.contains(&ext) => Err(
                ImportError::ExcelParseError("文件内容不是有效的工作簿".to_string()),
            ),
            Some(ext) => Err(ImportError::UnsupportedFormat(ext.to_string())),
        }
    }
}
