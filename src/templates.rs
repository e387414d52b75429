//! Canned code templates and explanations per (pattern, language).
//!
//! Only a handful of pairs are hand-authored; everything else gets a stub that
//! names the pattern and its formula.

use serde::Serialize;

use crate::domain::{Language, PatternRecord};

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct CodeTemplate {
  pub code: String,
  pub explanation: String,
}

/// Build the template for `pattern`. `language` is `None` when the caller sent a
/// language we don't know; that still yields a stub rather than an error.
pub fn template(pattern: &PatternRecord, language: Option<Language>) -> CodeTemplate {
  let code = language
    .and_then(|lang| authored_code(pattern.id, lang).map(str::to_string))
    .unwrap_or_else(|| stub_code(pattern, language));
  CodeTemplate { code, explanation: explanation(pattern) }
}

fn stub_code(pattern: &PatternRecord, language: Option<Language>) -> String {
  let c = language.map(|l| l.comment()).unwrap_or("//");
  format!(
    "{c} {name}\n{c} TODO: Implement this pattern\n{c} Formula: {formula}",
    name = pattern.name,
    formula = pattern.formula
  )
}

fn authored_code(pattern_id: u32, language: Language) -> Option<&'static str> {
  use Language::*;
  let code = match (pattern_id, language) {
    (1, Python) => SQUARE_PY,
    (1, Javascript) => SQUARE_JS,
    (1, Java) => SQUARE_JAVA,
    (1, Cpp) => SQUARE_CPP,
    (2, Python) => RIGHT_TRIANGLE_PY,
    (2, Javascript) => RIGHT_TRIANGLE_JS,
    (2, Java) => RIGHT_TRIANGLE_JAVA,
    (2, Cpp) => RIGHT_TRIANGLE_CPP,
    (11, Python) => HOLLOW_SQUARE_PY,
    (31, Python) => DIAMOND_PY,
    (31, Javascript) => DIAMOND_JS,
    (31, Java) => DIAMOND_JAVA,
    (31, Cpp) => DIAMOND_CPP,
    _ => return None,
  };
  Some(code)
}

fn explanation(pattern: &PatternRecord) -> String {
  let authored = match pattern.id {
    1 => Some(SQUARE_EXPLANATION),
    2 => Some(RIGHT_TRIANGLE_EXPLANATION),
    11 => Some(HOLLOW_SQUARE_EXPLANATION),
    31 => Some(DIAMOND_EXPLANATION),
    _ => None,
  };
  match authored {
    Some(text) => text.to_string(),
    None => format!(
      "This is a {difficulty} level pattern that requires:\n\n\
       1. **Loops**: {loops} nested loops\n\
       2. **Conditions**: {conditions} conditional statements\n\
       3. **Formula**: {formula}\n\n\
       The pattern creates a visual representation using:\n\
       - Outer loop for rows\n\
       - Inner loop for columns\n\
       - Conditional logic for special cases\n\
       - Print statements for output",
      difficulty = pattern.difficulty,
      loops = pattern.loops,
      conditions = pattern.conditions,
      formula = pattern.formula,
    ),
  }
}

const SQUARE_PY: &str = r#"# Square Pattern (Solid)
n = 4
for i in range(n):
    for j in range(n):
        print('*', end='')
    print()"#;

const SQUARE_JS: &str = r#"// Square Pattern (Solid)
const n = 4;
for (let i = 0; i < n; i++) {
    let row = '';
    for (let j = 0; j < n; j++) {
        row += '*';
    }
    console.log(row);
}"#;

const SQUARE_JAVA: &str = r#"// Square Pattern (Solid)
public class Main {
    public static void main(String[] args) {
        int n = 4;
        for (int i = 0; i < n; i++) {
            for (int j = 0; j < n; j++) {
                System.out.print("*");
            }
            System.out.println();
        }
    }
}"#;

const SQUARE_CPP: &str = r#"// Square Pattern (Solid)
#include <iostream>
using namespace std;

int main() {
    int n = 4;
    for (int i = 0; i < n; i++) {
        for (int j = 0; j < n; j++) {
            cout << "*";
        }
        cout << endl;
    }
    return 0;
}"#;

const RIGHT_TRIANGLE_PY: &str = r#"# Right Triangle Pattern
n = 4
for i in range(1, n + 1):
    print('*' * i)"#;

const RIGHT_TRIANGLE_JS: &str = r#"// Right Triangle Pattern
const n = 4;
for (let i = 1; i <= n; i++) {
    console.log('*'.repeat(i));
}"#;

const RIGHT_TRIANGLE_JAVA: &str = r#"// Right Triangle Pattern
public class Main {
    public static void main(String[] args) {
        int n = 4;
        for (int i = 1; i <= n; i++) {
            for (int j = 1; j <= i; j++) {
                System.out.print("*");
            }
            System.out.println();
        }
    }
}"#;

const RIGHT_TRIANGLE_CPP: &str = r#"// Right Triangle Pattern
#include <iostream>
using namespace std;

int main() {
    int n = 4;
    for (int i = 1; i <= n; i++) {
        for (int j = 1; j <= i; j++) {
            cout << "*";
        }
        cout << endl;
    }
    return 0;
}"#;

const HOLLOW_SQUARE_PY: &str = r#"# Hollow Square
n = 4
for i in range(n):
    for j in range(n):
        if i == 0 or i == n - 1 or j == 0 or j == n - 1:
            print('*', end='')
        else:
            print(' ', end='')
    print()"#;

const DIAMOND_PY: &str = r#"# Diamond Pattern (Solid)
n = 5
# Upper half
for i in range(n//2 + 1):
    spaces = ' ' * (n//2 - i)
    stars = '*' * (2*i + 1)
    print(spaces + stars)

# Lower half
for i in range(n//2 - 1, -1, -1):
    spaces = ' ' * (n//2 - i)
    stars = '*' * (2*i + 1)
    print(spaces + stars)"#;

const DIAMOND_JS: &str = r#"// Diamond Pattern (Solid)
const n = 5;
const half = Math.floor(n / 2);
for (let i = 0; i <= half; i++) {
    console.log(' '.repeat(half - i) + '*'.repeat(2 * i + 1));
}
for (let i = half - 1; i >= 0; i--) {
    console.log(' '.repeat(half - i) + '*'.repeat(2 * i + 1));
}"#;

const DIAMOND_JAVA: &str = r#"// Diamond Pattern (Solid)
public class Main {
    static void row(int half, int i) {
        for (int j = 0; j < half - i; j++) System.out.print(" ");
        for (int j = 0; j < 2 * i + 1; j++) System.out.print("*");
        System.out.println();
    }

    public static void main(String[] args) {
        int n = 5;
        int half = n / 2;
        for (int i = 0; i <= half; i++) row(half, i);
        for (int i = half - 1; i >= 0; i--) row(half, i);
    }
}"#;

const DIAMOND_CPP: &str = r#"// Diamond Pattern (Solid)
#include <iostream>
using namespace std;

void row(int half, int i) {
    for (int j = 0; j < half - i; j++) cout << " ";
    for (int j = 0; j < 2 * i + 1; j++) cout << "*";
    cout << endl;
}

int main() {
    int n = 5;
    int half = n / 2;
    for (int i = 0; i <= half; i++) row(half, i);
    for (int i = half - 1; i >= 0; i--) row(half, i);
    return 0;
}"#;

const SQUARE_EXPLANATION: &str = "This pattern creates a solid square using nested loops:

1. **Outer Loop**: Controls the rows (i from 0 to n-1)
2. **Inner Loop**: Controls the columns (j from 0 to n-1)
3. **Print**: Emit '*' for each column without a newline
4. **Newline**: After each row is complete, end the line

Key concepts:
- Nested loops for 2D structure
- Loop variables control position
- Time complexity O(n²), constant extra space";

const RIGHT_TRIANGLE_EXPLANATION: &str = "This pattern creates a right triangle:

1. **Loop**: Iterates i from 1 to n (inclusive)
2. **Row width**: Row i holds exactly i stars
3. **Newline**: Each row ends the line

Key concepts:
- One loop is enough when the language can repeat a string
- The inner loop variant prints j from 1 to i
- Incremental growth pattern";

const DIAMOND_EXPLANATION: &str = "This pattern creates a diamond shape:

1. **Upper Half**: Rows 0..=n/2 with increasing stars
2. **Lower Half**: Rows n/2-1 down to 0 with decreasing stars
3. **Spaces**: (n/2 - i) leading spaces center each row
4. **Stars**: (2*i + 1) stars per row

Key concepts:
- Two loops for the two halves
- Arithmetic on the row index drives both spaces and stars
- Symmetric construction";

const HOLLOW_SQUARE_EXPLANATION: &str = "This pattern creates a hollow square:

1. **Outer Loop**: Controls rows
2. **Inner Loop**: Controls columns
3. **Conditions**: Print '*' on the first or last row, or the first or last column
4. **Otherwise**: Print a space

Key concepts:
- Multiple conditions for boundary detection
- Hollow interior with solid border";
