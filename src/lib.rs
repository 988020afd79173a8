mod generate;
pub use generate::*;

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "#define kfooFirst 'abcd' // first\n\
                          #define kfooSecond 'efgh'\n\
                          #define kbarThird 'ijkl'\n";

    #[test]
    fn basic_generate() {
        let mut dest = Vec::new();
        generate(HEADER.as_bytes(), &mut dest).unwrap();
        let output = String::from_utf8(dest).unwrap();

        assert!(output.starts_with("\"\"\"\nConstants for descriptor."));
        assert!(output.contains("from enum import Enum as _Enum\n"));

        let kfoo = output.find("class Kfoo(_Enum):").unwrap();
        let kbar = output.find("class Kbar(_Enum):").unwrap();
        assert!(kfoo < kbar);

        let first = output.find("    First = b'abcd'\n").unwrap();
        let second = output.find("    Second = b'efgh'\n").unwrap();
        assert!(first < second && second < kbar);
        assert!(output.contains("    Third = b'ijkl'\n"));
    }

    #[test]
    fn basic_generate_string_terms() {
        let src = "#define kfooFirstStr \"first\"\n\
                   #define kbarSecondStr \"second\"\n";
        let mut dest = Vec::new();
        generate_string_terms(src.as_bytes(), &mut dest).unwrap();
        let output = String::from_utf8(dest).unwrap();

        // String terms collapse into one flat class, prefixes notwithstanding.
        assert_eq!(output.matches("class ").count(), 1);
        assert!(output.contains("class StringTerm(_Enum):"));
        assert!(output.contains("    FirstStr = b'first'\n"));
        assert!(output.contains("    SecondStr = b'second'\n"));
    }

    #[test]
    fn malformed_key_aborts_generation() {
        let src = "#define kfooFirst 'abcd'\n\
                   #define badkey 'wxyz'\n";
        let mut dest = Vec::new();
        assert!(generate(src.as_bytes(), &mut dest).is_err());
        // Nothing was emitted: classification runs to completion first.
        assert!(dest.is_empty());
    }
}
