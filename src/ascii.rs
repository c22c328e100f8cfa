/*! Line-oriented ASCII reply blocks: `ID`, `DNA`, `BNA`, and the idle
prompt matcher.

These replies are comma-separated rows of quoted fields, each row carrying
its own checksum as a four-hex-digit trailer. The checksum covers the row
exactly as transmitted, quotes and trailing comma included, so rows are
reconstructed before summing.
*/

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::checksum::checksum;
use crate::{Error, Result};

/// Identification strings from the ASCII `ID` reply. Fields the relay does
/// not report stay empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayIdent {
    /// Firmware identification string.
    pub fid: String,
    /// Boot firmware identification string.
    pub bfid: String,
    /// Checksum cross-reference identifier.
    pub cid: String,
    /// Device identifier.
    pub devid: String,
    /// Device code.
    pub devcode: String,
    /// Part number.
    pub partno: String,
    /// Configuration revision.
    pub config: String,
    /// Special-order designation.
    pub special: String,
}

/// Digital point names from the `DNA` reply: one row of eight names per
/// digital bank, in bank order.
pub type DnaMap = Vec<Vec<String>>;

/// Locate `"KEY=value","HHHH"` in the reply and return the value and the
/// hex checksum field.
fn find_row<'a>(text: &'a str, key: &str) -> Option<(&'a str, &'a str)> {
    let tag = format!("\"{key}=");
    let start = text.find(&tag)?;
    let rest = &text[start + tag.len()..];
    let value_end = rest.find('"')?;
    let value = &rest[..value_end];
    let rest = rest[value_end + 1..].strip_prefix(",\"")?;
    let checksum_end = rest.find('"')?;
    Some((value, &rest[..checksum_end]))
}

/// Parse the ASCII `ID` reply into a [`RelayIdent`].
///
/// Each recognized row is validated against its checksum field; a mismatch
/// is a hard error since it means the identification strings cannot be
/// trusted.
pub fn parse_id_block(data: &[u8]) -> Result<RelayIdent> {
    let text = String::from_utf8_lossy(data);
    let mut ident = RelayIdent::default();
    let fields: [(&str, &mut String); 8] = [
        ("FID", &mut ident.fid),
        ("BFID", &mut ident.bfid),
        ("CID", &mut ident.cid),
        ("DEVID", &mut ident.devid),
        ("DEVCODE", &mut ident.devcode),
        ("PARTNO", &mut ident.partno),
        ("CONFIG", &mut ident.config),
        ("SPECIAL", &mut ident.special),
    ];
    for (key, slot) in fields {
        let Some((value, hex)) = find_row(&text, key) else {
            log::debug!("relay ID block has no {key} row");
            continue;
        };
        let Ok(found) = u16::from_str_radix(hex.trim(), 16) else {
            log::debug!("relay ID row {key} carries unparseable checksum {hex:?}");
            continue;
        };
        let expected = checksum(format!("\"{key}={value}\",").as_bytes());
        if found != expected {
            return Err(Error::ChecksumFail { found, expected });
        }
        *slot = value.to_string();
    }
    Ok(ident)
}

/// Strip characters outside the printable ASCII range, which show up when
/// line noise lands inside a point name.
fn printable(field: &str) -> String {
    field
        .chars()
        .filter(|&c| (' '..='\x7f').contains(&c))
        .collect()
}

/// Parse comma-separated name rows: eight names followed by a hex row
/// checksum. Lines that don't look like rows (prompts, echoes) are
/// skipped; rows with a real checksum mismatch fail.
fn parse_name_rows(text: &str) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();
    for line in text.lines() {
        let columns: Vec<&str> = line.split(',').collect();
        if columns.len() < 9 {
            continue;
        }
        let names: Vec<String> = columns[..8].iter().map(|c| printable(c)).collect();
        let Ok(found) = u16::from_str_radix(columns[8].trim(), 16) else {
            log::debug!("skipping unparseable name row: {line:?}");
            continue;
        };
        let row_text = names.iter().map(|n| format!("\"{n}\"")).join(",") + ",";
        let expected = checksum(row_text.as_bytes());
        if found != expected {
            return Err(Error::ChecksumFail { found, expected });
        }
        rows.push(names);
    }
    Ok(rows)
}

/// Parse the ASCII `DNA` reply into a [`DnaMap`].
///
/// The reply is uppercased, any leading `>DNA` echo is removed, and every
/// remaining row is checksum-validated.
pub fn parse_dna_block(data: &[u8]) -> Result<DnaMap> {
    let text = String::from_utf8_lossy(data).to_uppercase();
    let text = match text.find("DNA") {
        Some(i) => &text[i + 3..],
        None => text.as_str(),
    };
    parse_name_rows(&text.replace('"', ""))
}

/// Parse the ASCII `BNA` reply: rows of eight bit names, structured like
/// the DNA block. All rows are processed.
pub fn parse_bna_block(data: &[u8]) -> Result<Vec<Vec<String>>> {
    let text = String::from_utf8_lossy(data);
    let text = match text.find("BNA") {
        Some(i) => &text[i + 3..],
        None => text.as_ref(),
    };
    parse_name_rows(&text.replace('"', ""))
}

/// True when the buffer contains the relay's idle prompt `=\r\n`,
/// i.e. the channel is quiet enough to issue a new command.
pub fn clean_prompt(data: &[u8]) -> bool {
    data.windows(3).any(|w| w == b"=\r\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_row_with_valid_checksum() -> crate::Result<()> {
        // Sum of '"FID=SEL-XXX",' is 0x399.
        let ident = parse_id_block(b"\"FID=SEL-XXX\",\"0399\"\r\n")?;
        assert_eq!(ident.fid, "SEL-XXX");
        assert_eq!(ident.partno, "");
        Ok(())
    }

    #[test]
    fn id_row_with_bad_checksum() {
        assert!(matches!(
            parse_id_block(b"\"FID=SEL-XXX\",\"0123\"\r\n"),
            Err(Error::ChecksumFail {
                found: 0x123,
                expected: 0x399
            })
        ));
    }

    #[test]
    fn id_block_collects_all_keys() -> crate::Result<()> {
        let mut block = Vec::new();
        for (key, value) in [
            ("FID", "SEL-311C-R100-V0-Z001001-D20010101"),
            ("BFID", "SLBT-3PC-R100"),
            ("CID", "A1B2"),
            ("DEVID", "FEEDER 12"),
            ("DEVCODE", "49"),
            ("PARTNO", "0311C00XXXX"),
            ("CONFIG", "111222"),
            ("SPECIAL", "0"),
        ] {
            let row = format!("\"{key}={value}\",");
            block.extend_from_slice(
                format!("{row}\"{:04X}\"\r\n", checksum(row.as_bytes())).as_bytes(),
            );
        }
        block.extend_from_slice(b"\r\n=");
        let ident = parse_id_block(&block)?;
        assert_eq!(ident.fid, "SEL-311C-R100-V0-Z001001-D20010101");
        assert_eq!(ident.devid, "FEEDER 12");
        assert_eq!(ident.devcode, "49");
        assert_eq!(ident.config, "111222");
        assert_eq!(ident.special, "0");
        Ok(())
    }

    #[test]
    fn dna_rows() -> crate::Result<()> {
        // '"IN1","IN2",..,"IN8",' sums to 0x9dc.
        let block = b"DNA\r\n\"IN1\",\"IN2\",\"IN3\",\"IN4\",\"IN5\",\"IN6\",\"IN7\",\"IN8\",\"09DC\"\r\n=>\r\n";
        let dna = parse_dna_block(block)?;
        assert_eq!(dna.len(), 1);
        assert_eq!(dna[0], vec!["IN1", "IN2", "IN3", "IN4", "IN5", "IN6", "IN7", "IN8"]);
        Ok(())
    }

    #[test]
    fn dna_placeholder_row_checksum() -> crate::Result<()> {
        // Same row with IN3 replaced by the '*' placeholder sums to 0x93c.
        let block =
            b"\"IN1\",\"IN2\",\"*\",\"IN4\",\"IN5\",\"IN6\",\"IN7\",\"IN8\",\"093C\"\r\n";
        let dna = parse_dna_block(block)?;
        assert_eq!(dna[0][2], "*");
        Ok(())
    }

    #[test]
    fn dna_lowercase_is_uppercased_before_validation() -> crate::Result<()> {
        let block =
            b">dna\r\n\"in1\",\"in2\",\"in3\",\"in4\",\"in5\",\"in6\",\"in7\",\"in8\",\"09DC\"\r\n";
        let dna = parse_dna_block(block)?;
        assert_eq!(dna[0][0], "IN1");
        Ok(())
    }

    #[test]
    fn dna_bad_checksum_fails() {
        let block = b"\"IN1\",\"IN2\",\"IN3\",\"IN4\",\"IN5\",\"IN6\",\"IN7\",\"IN8\",\"0001\"\r\n";
        assert!(matches!(
            parse_dna_block(block),
            Err(Error::ChecksumFail { found: 1, .. })
        ));
    }

    #[test]
    fn bna_processes_every_row() -> crate::Result<()> {
        let mut block = b"BNA\r\n".to_vec();
        for names in [["A1"; 8], ["B1"; 8]] {
            let row = names.iter().map(|n| format!("\"{n}\"")).join(",") + ",";
            block.extend_from_slice(
                format!("{row}\"{:04X}\"\r\n", checksum(row.as_bytes())).as_bytes(),
            );
        }
        let bna = parse_bna_block(&block)?;
        assert_eq!(bna.len(), 2);
        assert_eq!(bna[0][0], "A1");
        assert_eq!(bna[1][7], "B1");
        Ok(())
    }

    #[test]
    fn prompt_matcher() {
        assert!(clean_prompt(b"garbage\r\n=\r\n"));
        assert!(clean_prompt(b"=\r\n"));
        assert!(!clean_prompt(b"=>"));
        assert!(!clean_prompt(b""));
        assert!(!clean_prompt(b"=>\r\n"));
    }
}
