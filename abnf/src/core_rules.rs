/// The core rules of RFC 5234 Appendix B.1. HEXDIG letters are marked
/// case-insensitive explicitly so they keep RFC semantics under any
/// `char_val_case` setting.
pub const CORE_RULES: &str = "\
ALPHA = %x41-5A / %x61-7A
BIT = \"0\" / \"1\"
CHAR = %x01-7F
CR = %x0D
CRLF = CR LF
CTL = %x00-1F / %x7F
DIGIT = %x30-39
DQUOTE = %x22
HEXDIG = DIGIT / %i\"A\" / %i\"B\" / %i\"C\" / %i\"D\" / %i\"E\" / %i\"F\"
HTAB = %x09
LF = %x0A
LWSP = *(WSP / CRLF WSP)
OCTET = %x00-FF
SP = %x20
VCHAR = %x21-7E
WSP = SP / HTAB
";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::GrammarDocument;

    #[test]
    fn core_rules_parse() {
        let document: GrammarDocument = CORE_RULES.parse().unwrap();
        let names: Vec<_> = document.rules.iter().map(|r| r.name.to_string()).collect();
        assert_eq!(
            names,
            vec![
                "ALPHA", "BIT", "CHAR", "CR", "CRLF", "CTL", "DIGIT", "DQUOTE", "HEXDIG", "HTAB",
                "LF", "LWSP", "OCTET", "SP", "VCHAR", "WSP"
            ]
        );
    }
}
