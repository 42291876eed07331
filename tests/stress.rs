use path_registry::PathRegistry;

use std::collections::HashSet;

const TEMPLATES: usize = 1000;
const SAMPLES: usize = 10;

// Generates `count` structurally distinct templates, 1 to 7 segments deep,
// mixing literal and variable segments. Each template is paired with the
// concrete path obtained by substituting a fixed literal for its variables.
fn generate(rng: &mut fastrand::Rng, count: usize) -> Vec<(String, String)> {
    const LITERALS: &[&str] = &["pet", "store", "user", "order", "v1", "items", "a", "b"];
    const FILLER: &str = "42";

    let mut seen = HashSet::new();
    let mut generated = Vec::with_capacity(count);

    while generated.len() < count {
        let depth = rng.usize(1..=7);

        let mut template = String::new();
        let mut concrete = String::new();
        let mut shape = Vec::with_capacity(depth);

        for i in 0..depth {
            template.push('/');
            concrete.push('/');

            if rng.u8(0..4) == 0 {
                template.push_str(&format!("{{p{i}}}"));
                concrete.push_str(FILLER);
                shape.push(None);
            } else {
                let literal = LITERALS[rng.usize(..LITERALS.len())];
                template.push_str(literal);
                concrete.push_str(literal);
                shape.push(Some(literal));
            }
        }

        if seen.insert(shape) {
            generated.push((template, concrete));
        }
    }

    generated
}

#[test]
fn random_templates() {
    for seed in 0..SAMPLES as u64 {
        let mut rng = fastrand::Rng::with_seed(seed);
        let templates = generate(&mut rng, TEMPLATES);

        let mut registry = PathRegistry::new();
        for (i, (template, _)) in templates.iter().enumerate() {
            assert!(registry.insert(template, i), "seed {seed}: failed to insert '{template}'");
        }

        assert_eq!(registry.len(), TEMPLATES);

        for (i, (template, concrete)) in templates.iter().enumerate() {
            // the filler literal never collides with a literal segment, so the
            // substituted path resolves to its own template
            assert_eq!(
                registry.search(concrete),
                Some(&i),
                "seed {seed}: '{concrete}' did not resolve to '{template}'"
            );
        }

        // a second pass is idempotent
        for (i, (template, _)) in templates.iter().enumerate() {
            assert!(registry.insert(template, i));
        }
        assert_eq!(registry.len(), TEMPLATES);
    }
}

#[test]
fn random_templates_any_order() {
    let mut rng = fastrand::Rng::with_seed(7);
    let mut templates = generate(&mut rng, TEMPLATES)
        .into_iter()
        .enumerate()
        .collect::<Vec<_>>();

    let mut forward = PathRegistry::new();
    for (i, (template, _)) in &templates {
        assert!(forward.insert(template, *i));
    }

    rng.shuffle(&mut templates);

    let mut shuffled = PathRegistry::new();
    for (i, (template, _)) in &templates {
        assert!(shuffled.insert(template, *i));
    }

    for (i, (_, concrete)) in &templates {
        assert_eq!(forward.search(concrete), Some(i));
        assert_eq!(shuffled.search(concrete), Some(i));
    }

    assert!(forward.iter().eq(shuffled.iter()));
}
