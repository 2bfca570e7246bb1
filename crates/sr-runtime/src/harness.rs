//! JavaScript sources evaluated around the user script.
//!
//! Evaluation order is harness, constructor lock, global pruning, then the
//! user body. The harness captures the builtins it needs up front and is only
//! reachable through the handle returned to the host, so nothing it holds is
//! in scope for user code.

const DEBUG_MARKER: &str = "__SANDBOX_DEBUG__";

/// Harness method that starts the compiled body with the console facade.
pub(crate) const START_METHOD: &str = "start";

/// Harness method that returns the settlement report as JSON text.
pub(crate) const FINISH_METHOD: &str = "finish";

const HARNESS_SOURCE: &str = r#""use strict";
(function (debug, stringify, toText, freeze) {
    var state = { outcome: { status: "pending" }, logs: [] };
    function describe(error) {
        if (error !== null && typeof error === "object" && "message" in error) {
            return {
                message: toText(error.message),
                name: "name" in error ? toText(error.name) : null
            };
        }
        return { message: toText(error), name: null };
    }
    function render(arg) {
        if (arg !== null && typeof arg === "object") {
            try {
                return toText(stringify(arg));
            } catch (error) {
                return toText(arg);
            }
        }
        return toText(arg);
    }
    function record(level) {
        return function () {
            if (!debug) {
                return;
            }
            var line = "";
            for (var index = 0; index < arguments.length; index++) {
                line = index === 0 ? render(arguments[index]) : line + " " + render(arguments[index]);
            }
            state.logs[state.logs.length] = { level: level, line: line };
        };
    }
    function settle(value) {
        if (value === undefined) {
            state.outcome = { status: "undefined" };
            return;
        }
        try {
            var json = stringify(value);
            state.outcome = typeof json === "string"
                ? { status: "fulfilled", json: json }
                : {
                    status: "unserializable",
                    message: "a value of type " + typeof value + " has no JSON form"
                };
        } catch (error) {
            state.outcome = { status: "unserializable", message: describe(error).message };
        }
    }
    function fail(error) {
        var described = describe(error);
        state.outcome = {
            status: "rejected",
            message: described.message,
            name: described.name
        };
    }
    var sandboxConsole = freeze({
        log: record("log"),
        info: record("info"),
        warn: record("warn"),
        error: record("error"),
        debug: record("debug")
    });
    return freeze({
        start: function (body) {
            try {
                body(sandboxConsole).then(settle, fail);
            } catch (error) {
                fail(error);
            }
        },
        finish: function () {
            return stringify(state);
        }
    });
})(__SANDBOX_DEBUG__, JSON.stringify, String, Object.freeze)
"#;

/// Replaces `constructor` on every function prototype so no function value
/// leads back to a code-compiling constructor.
pub(crate) const LOCK_CONSTRUCTORS_SOURCE: &str = r#""use strict";
(function (define, protoOf) {
    function blocked() {
        throw new TypeError("Dynamic code construction is disabled");
    }
    var samples = [function () {}, async function () {}, function* () {}, async function* () {}];
    for (var index = 0; index < samples.length; index++) {
        try {
            define(protoOf(samples[index]), "constructor", {
                value: blocked,
                writable: false,
                enumerable: false,
                configurable: false
            });
        } catch (error) {}
    }
})(Object.defineProperty, Object.getPrototypeOf);
"#;

/// Harness source; evaluating it yields the `{start, finish}` handle.
pub(crate) fn harness_source(debug: bool) -> String {
    HARNESS_SOURCE.replacen(DEBUG_MARKER, if debug { "true" } else { "false" }, 1)
}

/// Deletes every configurable global that is not allow-listed.
pub(crate) fn prune_globals_source(allowed: &[String]) -> String {
    let mut names = allowed.iter().map(String::as_str).collect::<Vec<_>>();
    names.sort_unstable();
    names.dedup();
    let list = names
        .iter()
        .map(|name| format!("\"{}\"", name.escape_default()))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#""use strict";
(function (global, allowed) {{
    Object.getOwnPropertyNames(global).forEach(function (key) {{
        if (allowed.indexOf(key) === -1) {{
            try {{
                delete global[key];
            }} catch (error) {{}}
        }}
    }});
}})(globalThis, [{}]);
"#,
        list
    )
}

/// Compiles `body` as a separate script whose value is an async arrow
/// function taking only `console`.
pub(crate) fn wrap_script(body: &str) -> String {
    let mut source = String::with_capacity(body.len() + 48);
    source.push_str("\"use strict\";\n(async (console) => {\n");
    source.push_str(body);
    source.push_str("\n})\n");
    source
}
