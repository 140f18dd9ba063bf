//! Harness synthesis
//!
//! Builds one self-contained Python program: the learner's source verbatim,
//! followed by a driver that runs the target callable against every test case
//! and prints a single record line.
//!
//! Test data is never spliced into the program as syntax. The cases are
//! serialized to JSON, base64-encoded, and decoded by the driver at runtime,
//! so the only bytes that land inside a string literal come from the base64
//! alphabet.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::protocol::{PROTOCOL_VERSION, Payload, RECORD_MARKER};
use crate::tasks::Task;

const PAYLOAD_SLOT: &str = "__CODETRAINER_PAYLOAD__";
const MARKER_SLOT: &str = "__CODETRAINER_MARKER__";
const VERSION_SLOT: &str = "__CODETRAINER_VERSION__";
const FLOAT_MAX_SLOT: &str = "__CODETRAINER_FLOAT_MAX__";

const DRIVER_TEMPLATE: &str = r#"

# ---- codetrainer driver ----
def __codetrainer_main():
    import base64 as _base64
    import json as _json
    import math as _math
    import sys as _sys

    payload = _json.loads(_base64.b64decode("__CODETRAINER_PAYLOAD__").decode("utf-8"))
    target = globals().get(payload["target"])
    if not callable(target):
        _sys.stderr.write("NameError: callable %r is not defined\n" % payload["target"])
        _sys.stderr.flush()
        _sys.exit(2)

    def same(left, right):
        if isinstance(left, bool) or isinstance(right, bool):
            return isinstance(left, bool) and isinstance(right, bool) and left == right
        if isinstance(left, (int, float)) and isinstance(right, (int, float)):
            return left == right
        if isinstance(left, str) or isinstance(right, str):
            return isinstance(left, str) and isinstance(right, str) and left == right
        if left is None or right is None:
            return left is None and right is None
        if isinstance(left, (list, tuple)) and isinstance(right, (list, tuple)):
            return len(left) == len(right) and all(same(a, b) for a, b in zip(left, right))
        if isinstance(left, dict) and isinstance(right, dict):
            return len(left) == len(right) and all(
                key in right and same(value, right[key]) for key, value in left.items()
            )
        return False

    def clean(text):
        return text.encode("utf-8", "backslashreplace").decode("utf-8")

    def fits(value):
        if value is None or isinstance(value, bool):
            return True
        if isinstance(value, int):
            return -__CODETRAINER_FLOAT_MAX__ <= value <= __CODETRAINER_FLOAT_MAX__
        if isinstance(value, float):
            return _math.isfinite(value)
        if isinstance(value, str):
            try:
                value.encode("utf-8")
            except UnicodeEncodeError:
                return False
            return True
        if isinstance(value, (list, tuple)):
            return all(fits(item) for item in value)
        if isinstance(value, dict):
            return all(
                isinstance(key, str) and fits(key) and fits(item)
                for key, item in value.items()
            )
        return False

    def portable(value):
        try:
            if fits(value):
                return value
        except RecursionError:
            pass
        try:
            text = repr(value)
        except Exception:
            text = "<unrepresentable %s>" % type(value).__name__
        return clean(text)

    def describe(exc):
        name = clean(type(exc).__name__)
        try:
            message = clean(str(exc))
        except Exception:
            message = "<unprintable message>"
        if len(message) > 300:
            message = message[:297] + "..."
        if not message:
            return name
        return "%s: %s" % (name, message)

    details = []
    passed = 0
    for case in payload["cases"]:
        detail = {
            "description": case["description"],
            "passed": False,
            "expected": case["expected"],
            "actual": None,
            "error": None,
        }
        try:
            output = target(*case["args"], **case["kwargs"])
        except KeyboardInterrupt:
            raise
        except BaseException as exc:
            detail["error"] = describe(exc)
        else:
            detail["actual"] = portable(output)
            detail["passed"] = same(output, case["expected"])
        if detail["passed"]:
            passed += 1
        details.append(detail)

    record = {
        "version": __CODETRAINER_VERSION__,
        "pass_count": passed,
        "total": len(details),
        "details": details,
    }
    line = "__CODETRAINER_MARKER__ " + _json.dumps(record, ensure_ascii=True, allow_nan=False)
    try:
        _sys.stdout.flush()
    except Exception:
        pass
    _sys.__stdout__.write("\n" + line + "\n")
    _sys.__stdout__.flush()


__codetrainer_main()
"#;

/// Encode the task's test cases for the driver
fn encode_payload(task: &Task) -> String {
    STANDARD.encode(Payload::for_task(task).to_json())
}

/// Fill every slot of the driver template
fn render_driver(task: &Task) -> String {
    DRIVER_TEMPLATE
        .replace(PAYLOAD_SLOT, &encode_payload(task))
        .replace(MARKER_SLOT, RECORD_MARKER)
        .replace(VERSION_SLOT, &PROTOCOL_VERSION.to_string())
        .replace(FLOAT_MAX_SLOT, &format!("{:e}", f64::MAX))
}

/// Combine learner source with a generated driver for `task`.
///
/// The learner's source is kept byte-for-byte; its own syntax errors or a
/// missing callable surface when the program runs, not here.
pub fn synthesize(source: &str, task: &Task) -> String {
    let driver = render_driver(task);

    let mut program = String::with_capacity(source.len() + driver.len() + 1);
    program.push_str(source);
    if !source.ends_with('\n') {
        program.push('\n');
    }
    program.push_str(&driver);
    program
}
