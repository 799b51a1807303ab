use super::*;

fn parse_args(argv: &[&str]) -> Args {
    Args::try_parse_from(argv)
        .unwrap_or_else(|err| panic!("argv={argv:?} should parse successfully: {err}"))
}

#[test]
fn no_subcommand_means_chat() {
    let args = parse_args(&["eda"]);
    assert!(args.command.is_none());
    assert_eq!(args.verbose, 0);
    assert!(args.log.is_none());
}

#[test]
fn global_flags_work_after_subcommand() {
    let args = parse_args(&["eda", "chat", "--file", "notes.pdf", "-vv", "--log", "chat.log"]);
    assert_eq!(args.verbose, 2);
    assert_eq!(args.log, Some(PathBuf::from("chat.log")));
    assert_eq!(
        args.command,
        Some(Commands::Chat {
            file: Some(PathBuf::from("notes.pdf"))
        })
    );
}

#[test]
fn ask_collects_trailing_words() {
    let args = parse_args(&["eda", "ask", "-f", "bio.txt", "--local", "what", "is", "ATP?"]);
    assert_eq!(
        args.command,
        Some(Commands::Ask {
            file: Some(PathBuf::from("bio.txt")),
            local: true,
            search: false,
            prompt: vec!["what".into(), "is".into(), "ATP?".into()],
        })
    );
}

#[test]
fn ask_rejects_local_without_file_and_empty_prompt() {
    assert!(Args::try_parse_from(["eda", "ask", "--local", "question"]).is_err());
    assert!(Args::try_parse_from(["eda", "ask"]).is_err());
}

#[test]
fn quiz_count_defaults_and_is_bounded() {
    match parse_args(&["eda", "quiz", "doc.pdf"]).command {
        Some(Commands::Quiz { count, json, .. }) => {
            assert_eq!(count, DEFAULT_QUIZ_COUNT);
            assert!(!json);
        }
        _ => panic!("expected quiz command"),
    }
    match parse_args(&["eda", "quiz", "doc.pdf", "-n", "5", "--json"]).command {
        Some(Commands::Quiz { count, json, .. }) => {
            assert_eq!(count, 5);
            assert!(json);
        }
        _ => panic!("expected quiz command"),
    }
    assert!(Args::try_parse_from(["eda", "quiz", "doc.pdf", "-n", "0"]).is_err());
    assert!(Args::try_parse_from(["eda", "quiz", "doc.pdf", "-n", "500"]).is_err());
}

#[test]
fn render_repair_flags_conflict() {
    assert!(Args::try_parse_from(["eda", "render", "--repair-only", "--no-repair"]).is_err());
    assert_eq!(
        parse_args(&["eda", "render", "-", "--repair-only"]).command,
        Some(Commands::Render {
            file: Some(PathBuf::from("-")),
            repair_only: true,
            no_repair: false,
        })
    );
}

#[test]
fn set_accepts_multi_word_values_and_bare_form() {
    assert_eq!(
        parse_args(&["eda", "set", "chat-model", "my", "model"]).command,
        Some(Commands::Set {
            key: Some("chat-model".into()),
            value: vec!["my".into(), "model".into()],
        })
    );
    assert_eq!(
        parse_args(&["eda", "set"]).command,
        Some(Commands::Set {
            key: None,
            value: Vec::new(),
        })
    );
}
