use std::fs;
use std::path::Path;
use vardiscover::config::StalePolicy;
use vardiscover::context_classifier::FallbackSpec;
use vardiscover::discovery;
use vardiscover::{Category, DiscoveryConfig, Position, VariableDiscoverer};

const SSH_TEMPLATES: &str = "\
E1 120 <V0> LabSZ sshd[<V1>]: Failed password for <V2> from <V3> port <V4> ssh2
E2 40 <V0> LabSZ sshd[<V1>]: pam_unix(sshd:auth): authentication failure; logname= uid=0 euid=0 tty=ssh ruser= rhost=<V2> user=<V3>
E3 7 Received disconnect reason <V0>
";

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

#[test]
fn context_only_inference_on_auth_failure_template() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "ssh.zip.templates", SSH_TEMPLATES);
    let mut d = VariableDiscoverer::default();
    d.ingest_templates(dir.path().join("ssh.zip.templates")).unwrap();

    let content = d.templates().get(2).unwrap().to_string();
    let rhost = d.score_from_context(&content, 2);
    assert_eq!(rhost.get(&Category::Ip), Some(&2));
    let user = d.score_from_context(&content, 3);
    assert_eq!(user.get(&Category::Username), Some(&2));

    // `rhost` also carries `host`, so the hostname cue ties with ip
    assert!(d.infer(&Position::new(2, 2)).contains(&Category::Ip));
}

#[test]
fn separated_cues_select_their_own_label() {
    let mut d = VariableDiscoverer::default();
    d.templates_mut().insert(5, "rhost=<V1> was seen; later, for user=<V2> ok");
    let content = d.templates().get(5).unwrap().to_string();
    let user = d.score_from_context(&content, 2);
    assert_eq!(user.len(), 1);
    assert_eq!(user.get(&Category::Username), Some(&2));
    assert_eq!(d.infer(&Position::new(5, 2)), vec![Category::Username]);
    assert!(d.infer(&Position::new(5, 1)).contains(&Category::Ip));
}

#[test]
fn positional_fallback_selects_time_below_threshold() {
    let mut d = VariableDiscoverer::default();
    d.templates_mut().insert(9, "<V0> - - <V1> done");
    let pos = Position::new(9, 0);
    let ctx = d.score_from_context(d.templates().get(9).unwrap(), 0);
    assert_eq!(ctx.len(), 1);
    assert_eq!(ctx.get(&Category::Time), Some(&1));
    assert_eq!(d.infer(&pos), vec![Category::Time]);
}

#[test]
fn leading_placeholder_with_samples_gets_no_time_label() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "ssh.zip.templates", SSH_TEMPLATES);
    let lead = Position::new(1, 0);
    write(
        dir.path(),
        "ssh.zip.variables",
        &format!("{} V 3
x node1.example.com db.internal.net web-3.example.org
", lead.var_id()),
    );
    let mut d = VariableDiscoverer::default();
    d.ingest_templates(dir.path().join("ssh.zip.templates")).unwrap();
    d.ingest_samples(dir.path().join("ssh.zip.variables")).unwrap();

    assert_eq!(d.infer(&lead), vec![Category::Hostname]);
    // without samples the same slot still falls back to time
    assert_eq!(d.infer(&Position::new(2, 0)), vec![Category::Time]);
}

#[test]
fn unscored_placeholder_gets_synthesized_alias() {
    let mut d = VariableDiscoverer::default();
    d.templates_mut().insert(3, "Received disconnect reason <V0> <V1> <V2>");
    let report = d.generate();
    assert_eq!(report.suggestions.get("var_3_2"), Some(&[Position::new(3, 2)][..]));
    for p in d.templates().positions() {
        assert!(report.suggestions.contains_position(&p), "{p} dropped");
    }
}

#[test]
fn samples_and_context_combine_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "ssh.zip.templates", SSH_TEMPLATES);
    let ip_var = Position::new(1, 3).var_id();
    let user_var = Position::new(1, 2).var_id();
    write(
        dir.path(),
        "ssh.zip.variables",
        &format!("{ip_var} V 3\na 192.168.1.1 10.0.0.5 8.8.8.8\n{user_var} V 2\nx root admin\n"),
    );
    let pairs = discovery::find_pairs(dir.path()).unwrap();
    assert_eq!(pairs.len(), 1);
    assert!(pairs[0].variables.is_some());

    let mut d = VariableDiscoverer::default();
    d.ingest_templates(&pairs[0].templates).unwrap();
    d.ingest_samples(pairs[0].variables.as_ref().unwrap()).unwrap();

    assert_eq!(d.score_from_samples(ip_var).get(&Category::Ip), Some(&9));
    let report = d.generate();
    assert!(report.suggestions.get("ip").unwrap().contains(&Position::new(1, 3)));
    assert!(report.suggestions.get("username").unwrap().contains(&Position::new(1, 2)));
    assert_eq!(report.template_count, 3);
    assert_eq!(report.position_count, 5 + 4 + 1);
}

#[test]
fn rendering_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.zip.templates", SSH_TEMPLATES);
    write(dir.path(), "b.zip.templates", "E7 2 GET <V0> status <V1> from host <V2>\n");
    let run = || {
        let mut d = VariableDiscoverer::default();
        for p in discovery::find_pairs(dir.path()).unwrap() {
            d.ingest_templates(&p.templates).unwrap();
        }
        d.generate().suggestions.render()
    };
    let first = run();
    assert_eq!(first, run());

    let aliases: Vec<&str> = first
        .lines()
        .filter(|l| !l.starts_with('#') && !l.is_empty())
        .map(|l| l.split(':').next().unwrap())
        .collect();
    let mut sorted = aliases.clone();
    sorted.sort();
    assert_eq!(aliases, sorted);
}

#[test]
fn stale_positions_are_reported_not_emitted() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.zip.templates", "E1 1 user <V0> from <V1>\n");
    write(dir.path(), "b.zip.templates", "E1 1 user <V0>\n");
    let mut d = VariableDiscoverer::default();
    for p in discovery::find_pairs(dir.path()).unwrap() {
        d.ingest_templates(&p.templates).unwrap();
    }
    let report = d.generate();
    assert_eq!(report.stale, vec![Position::new(1, 1)]);
    assert!(!report.suggestions.render().contains("E1_V1"));

    let cfg = DiscoveryConfig { stale_positions: StalePolicy::Keep, ..Default::default() };
    let mut keep = VariableDiscoverer::new(cfg);
    for p in discovery::find_pairs(dir.path()).unwrap() {
        keep.ingest_templates(&p.templates).unwrap();
    }
    assert!(keep.generate().suggestions.render().contains("E1_V1"));
}

#[test]
fn fallbacks_configurable_from_json() {
    let cfg = DiscoveryConfig::from_json(r#"{"fallback_heuristics": []}"#).unwrap();
    let mut d = VariableDiscoverer::new(cfg);
    d.templates_mut().insert(1, "<V0> <V1>");
    let report = d.generate();
    assert!(report.suggestions.get("time").is_none());
    assert!(report.suggestions.get("var_1_0").is_some());

    let labsz = DiscoveryConfig {
        fallback_heuristics: vec![FallbackSpec::Literal { needle: "LabSZ".into(), below: 3, weight: 2 }],
        ..Default::default()
    };
    let mut d = VariableDiscoverer::new(labsz);
    d.templates_mut().insert(1, "<V0> LabSZ <V1> <V2> <V3>");
    let time = d.generate().suggestions.get("time").map(|p| p.to_vec()).unwrap_or_default();
    assert_eq!(time, vec![Position::new(1, 0), Position::new(1, 1), Position::new(1, 2)]);
}
