// This file is part of oxsh, a POSIX command interpreter.
// Copyright (C) 2024 WATANABE Yuki
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Whole-shell tests
//!
//! These tests run the compiled `oxsh` binary with `-c` command strings
//! and check the produced output and exit status.

use std::process::{Command, Output};

const BIN: &str = env!("CARGO_BIN_EXE_oxsh");

fn run(script: &str) -> Output {
    Command::new(BIN)
        .arg("-c")
        .arg(script)
        .output()
        .expect("the shell binary must run")
}

fn stdout_of(script: &str) -> String {
    let output = run(script);
    assert!(
        output.status.success(),
        "script {script:?} failed: {output:?}"
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn status_of(script: &str) -> i32 {
    run(script).status.code().expect("no exit code")
}

#[test]
fn echo_and_exit_status() {
    assert_eq!(stdout_of("echo hello world"), "hello world\n");
    assert_eq!(status_of("exit 3"), 3);
    assert_eq!(status_of("exit 260"), 4);
    assert_eq!(status_of("true"), 0);
    assert_eq!(status_of("false"), 1);
}

#[test]
fn arithmetic_number_bases() {
    assert_eq!(stdout_of("echo $((010)) $((0x10)) $((10))"), "8 16 10\n");
}

#[test]
fn arithmetic_operators() {
    assert_eq!(stdout_of("echo $((2 + 3 * 4))"), "14\n");
    assert_eq!(stdout_of("echo $((1 ? 10 : 20))"), "10\n");
    assert_eq!(stdout_of("echo $(( (1 << 4) | 2 ))"), "18\n");
    assert_eq!(stdout_of("x=5; echo $((x *= 3)) $x"), "15 15\n");
    assert_eq!(stdout_of("echo $((0 && (x=1))) ${x:-unset}"), "0 unset\n");
    assert_ne!(status_of("echo $((1/0))"), 0);
}

#[test]
fn field_splitting_with_ifs() {
    let script = r#"IFS=:; x='a::b'; set -- $x; printf '<%s>' "$#" "$1" "$2" "$3"; echo"#;
    assert_eq!(stdout_of(script), "<3><a><><b>\n");

    let script = r#"IFS=:; x='a::b'; set -- "$x"; printf '<%s>' "$#" "$1"; echo"#;
    assert_eq!(stdout_of(script), "<1><a::b>\n");
}

#[test]
fn quoting_controls_splitting_and_globbing() {
    assert_eq!(stdout_of(r#"x='a b'; printf '<%s>' $x; echo"#), "<a><b>\n");
    assert_eq!(
        stdout_of(r#"x='a b'; printf '<%s>' "$x"; echo"#),
        "<a b>\n"
    );
    assert_eq!(stdout_of(r#"echo "one    two""#), "one    two\n");
}

#[test]
fn parameter_expansion_modifiers() {
    assert_eq!(stdout_of("echo ${x:-default}"), "default\n");
    assert_eq!(stdout_of("x=set; echo ${x:-default}"), "set\n");
    assert_eq!(stdout_of("echo ${x:=assigned}; echo $x"), "assigned\nassigned\n");
    assert_eq!(stdout_of("x=hello; echo ${#x}"), "5\n");
    assert_eq!(stdout_of("x=a/b/c.d; echo ${x##*/} ${x%.*}"), "c.d a/b/c\n");
    assert_eq!(stdout_of("x=abcdef; echo ${x:1:3}"), "bcd\n");
    assert_ne!(status_of("echo ${nosuch:?oops}"), 0);
}

#[test]
fn positional_parameters_and_shift() {
    assert_eq!(
        stdout_of("set -- a b c; echo $# $1 $3; shift 2; echo $# $1"),
        "3 a c\n1 c\n"
    );
}

#[test]
fn command_substitution_strips_trailing_newlines() {
    assert_eq!(stdout_of("echo \"[$(echo inner)]\""), "[inner]\n");
    assert_eq!(stdout_of("x=$(printf '%s' abc); echo $x"), "abc\n");
    assert_eq!(stdout_of("echo `echo back`"), "back\n");
    // Nested substitutions
    assert_eq!(stdout_of("echo $(echo $(echo deep))"), "deep\n");
}

#[test]
fn pipelines() {
    assert_eq!(stdout_of("echo upper | cat"), "upper\n");
    assert_eq!(status_of("false | true"), 0);
    assert_eq!(status_of("set -o pipefail; false | true"), 1);
    assert_eq!(status_of("true | false"), 1);
    assert_eq!(status_of("! true"), 1);
    assert_eq!(status_of("! false"), 0);
}

#[test]
fn and_or_lists() {
    assert_eq!(stdout_of("true && echo yes || echo no"), "yes\n");
    assert_eq!(stdout_of("false && echo yes || echo no"), "no\n");
    assert_eq!(status_of("false || false"), 1);
}

#[test]
fn compound_commands() {
    assert_eq!(
        stdout_of("if true; then echo t; else echo f; fi"),
        "t\n"
    );
    assert_eq!(
        stdout_of("for i in 1 2 3; do printf '%s' $i; done; echo"),
        "123\n"
    );
    assert_eq!(
        stdout_of("i=0; while [ $i -lt 3 ]; do i=$((i+1)); printf '%s' $i; done; echo"),
        "123\n"
    );
    assert_eq!(
        stdout_of("i=0; until [ $i -ge 2 ]; do i=$((i+1)); done; echo $i"),
        "2\n"
    );
    assert_eq!(
        stdout_of("case abc in x) echo x ;; a*) echo star ;; *) echo other ;; esac"),
        "star\n"
    );
    assert_eq!(stdout_of("{ echo a; echo b; }"), "a\nb\n");
}

#[test]
fn break_out_of_nested_loop() {
    let script = "for i in 1 2; do for j in a b; do [ $j = a ] && break 2; echo $i$j; done; done";
    let output = run(script);
    assert_eq!(String::from_utf8_lossy(&output.stdout), "");
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn continue_in_loop() {
    assert_eq!(
        stdout_of("for i in 1 2 3; do [ $i = 2 ] && continue; printf '%s' $i; done; echo"),
        "13\n"
    );
}

#[test]
fn subshell_isolation() {
    assert_eq!(stdout_of("x=outer; (x=inner; echo $x); echo $x"), "inner\nouter\n");
    assert_eq!(status_of("(exit 5)"), 5);
}

#[test]
fn function_locality() {
    assert_eq!(stdout_of("f(){ x=1; }; x=0; f; echo $x"), "1\n");
    assert_eq!(stdout_of("f(){ local x=1; }; x=0; f; echo $x"), "0\n");
    assert_eq!(
        stdout_of("f(){ echo $# $1; }; set -- outer; f inner; echo $1"),
        "1 inner\nouter\n"
    );
    assert_eq!(status_of("f(){ return 7; }; f"), 7);
}

#[test]
fn here_documents() {
    assert_eq!(stdout_of("cat <<EOF\nhello\nworld\nEOF"), "hello\nworld\n");
    assert_eq!(stdout_of("cat <<-END\n\thello\n\tEND"), "hello\n");
    assert_eq!(stdout_of("x=subst; cat <<EOF\nvalue: $x\nEOF"), "value: subst\n");
    assert_eq!(stdout_of("x=subst; cat <<'EOF'\nvalue: $x\nEOF"), "value: $x\n");
}

#[test]
fn redirections() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("out.txt");
    let file = file.to_str().unwrap();

    assert_eq!(status_of(&format!("echo first >{file}")), 0);
    assert_eq!(stdout_of(&format!("cat <{file}")), "first\n");
    assert_eq!(status_of(&format!("echo second >>{file}")), 0);
    assert_eq!(stdout_of(&format!("cat {file}")), "first\nsecond\n");

    // Duplication: errors redirected to stdout are captured.
    let output = run("echo visible 2>&1");
    assert_eq!(String::from_utf8_lossy(&output.stdout), "visible\n");
}

#[test]
fn noclobber_refuses_to_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("protected");
    let file = file.to_str().unwrap();
    assert_eq!(status_of(&format!("echo x >{file}")), 0);
    assert_ne!(status_of(&format!("set -C; echo y >{file}")), 0);
    assert_eq!(status_of(&format!("set -C; echo y >|{file}")), 0);
}

#[test]
fn readonly_variables() {
    let output = run("readonly x=1; x=2");
    assert_ne!(output.status.code(), Some(0));

    let output = run("readonly x=1; x=2; echo not reached");
    assert_eq!(String::from_utf8_lossy(&output.stdout), "");
}

#[test]
fn errexit_option() {
    let output = run("set -e; false; echo not reached");
    assert_eq!(String::from_utf8_lossy(&output.stdout), "");
    assert_eq!(output.status.code(), Some(1));

    // Tested contexts do not trigger errexit.
    assert_eq!(stdout_of("set -e; if false; then :; fi; echo ok"), "ok\n");
    assert_eq!(stdout_of("set -e; false || true; echo ok"), "ok\n");
    assert_eq!(stdout_of("set -e; ! false; echo ok"), "ok\n");
}

#[test]
fn unset_option_and_builtin() {
    assert_ne!(status_of("set -u; echo $nosuch"), 0);
    assert_eq!(stdout_of("x=1; unset x; echo ${x:-gone}"), "gone\n");
}

#[test]
fn exit_status_parameter() {
    assert_eq!(stdout_of("true; echo $?; false; echo $?"), "0\n1\n");
    assert_eq!(stdout_of("(exit 42); echo $?"), "42\n");
}

#[test]
fn special_parameters() {
    assert_eq!(stdout_of("set -- a b c; echo $#"), "3\n");
    assert_eq!(
        stdout_of(r#"set -- 'a b' c; printf '<%s>' "$@"; echo"#),
        "<a b><c>\n"
    );
    assert_eq!(
        stdout_of(r#"IFS=:; set -- a b; printf '<%s>' "$*"; echo"#),
        "<a:b>\n"
    );
}

#[test]
fn tilde_expansion() {
    let output = run("HOME=/test/home; echo ~ ~/sub");
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "/test/home /test/home/sub\n"
    );
}

#[test]
fn pathname_expansion() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::File::create(dir.path().join("a.txt")).unwrap();
    std::fs::File::create(dir.path().join("b.txt")).unwrap();
    std::fs::File::create(dir.path().join("c.log")).unwrap();
    let pattern = format!("{}/*.txt", dir.path().display());
    let expected = format!(
        "{} {}\n",
        dir.path().join("a.txt").display(),
        dir.path().join("b.txt").display(),
    );
    assert_eq!(stdout_of(&format!("echo {pattern}")), expected);

    // No match leaves the pattern literally.
    let pattern = format!("{}/*.nothing", dir.path().display());
    assert_eq!(stdout_of(&format!("echo {pattern}")), format!("{pattern}\n"));
}

#[test]
fn aliases_are_substituted() {
    // Alias substitution happens when a line is parsed, so the
    // definition must come on an earlier line than the use.
    use std::io::Write;
    use std::process::Stdio;
    let mut child = Command::new(BIN)
        .arg("-s")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"alias greet='echo hi'\ngreet there\nalias echo='echo E:'\necho x\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    // The self-referring alias expands once thanks to the recursion
    // guard.
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "hi there\nE: x\n"
    );
}

#[test]
fn eval_and_dot() {
    assert_eq!(stdout_of("eval 'x=5; echo $x'"), "5\n");

    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("lib.sh");
    std::fs::write(&script, "sourced=yes\nreturn 3\nsourced=no\n").unwrap();
    let script = script.to_str().unwrap();
    assert_eq!(
        stdout_of(&format!(". {script}; echo $? $sourced")),
        "3 yes\n"
    );
}

#[test]
fn background_jobs_and_wait() {
    assert_eq!(stdout_of("true & wait $!; echo $?"), "0\n");
    let output = run("sleep 10 & echo started; kill $!");
    assert_eq!(String::from_utf8_lossy(&output.stdout), "started\n");
}

#[test]
fn exit_trap_runs_on_exit() {
    assert_eq!(stdout_of("trap 'echo bye' EXIT; echo hi"), "hi\nbye\n");
    let output = run("trap 'echo bye' EXIT; exit 4");
    assert_eq!(String::from_utf8_lossy(&output.stdout), "bye\n");
    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn command_not_found_is_127() {
    assert_eq!(status_of("definitely-no-such-command-xyz"), 127);
}

#[test]
fn syntax_error_is_2() {
    let output = run("if true; fi");
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn script_files_run_with_positional_params() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("script.sh");
    std::fs::write(&script, "echo $0 $1 $2\n").unwrap();
    let output = Command::new(BIN)
        .arg(script.to_str().unwrap())
        .args(["one", "two"])
        .output()
        .unwrap();
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        format!("{} one two\n", script.display())
    );
}

#[test]
fn printf_round_trip() {
    // Captured output of printf equals the original with trailing
    // newlines removed.
    assert_eq!(stdout_of(r#"x=$(printf '%s' 'a b  c'); printf '%s' "$x""#), "a b  c");
}

#[test]
fn keywords_in_argument_position_are_words() {
    assert_eq!(stdout_of("echo if then fi"), "if then fi\n");
}

#[test]
fn line_continuation() {
    assert_eq!(stdout_of("ec\\\nho joined"), "joined\n");
}

#[test]
fn multiple_here_docs_on_one_line() {
    assert_eq!(
        stdout_of("cat <<A; cat <<B\nfirst\nA\nsecond\nB"),
        "first\nsecond\n"
    );
}
