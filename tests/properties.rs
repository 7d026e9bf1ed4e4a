//! Round-trip / law-style tests (spec.md §8), in the style of the one other
//! suffix-tree-shaped crate in the pack
//! (`StefanFrederiksen-CompressingStringCollections/suffix_tree`) that
//! reaches for `quickcheck` rather than the teacher crate, which has none.

extern crate ogst;

use ogst::SuffixTree;
use quickcheck_macros::quickcheck;

/// Quickcheck's default `Vec<u8>` generator produces near-uniform random
/// bytes, which almost never share a substring with each other. Folding
/// down to four letters gives repeats a real chance of showing up, the
/// same trick DNA/codon-shaped fixtures elsewhere in the pack use.
fn small_alphabet(bytes: &[u8]) -> Vec<u8> {
    bytes.iter().map(|b| b'a' + (b % 4)).collect()
}

fn contains_subslice(haystack: &[u8], needle: &[u8]) -> bool {
    if needle.is_empty() {
        return true;
    }
    if needle.len() > haystack.len() {
        return false;
    }
    haystack.windows(needle.len()).any(|w| w == needle)
}

#[quickcheck]
fn contains_iff_substring(text: Vec<u8>, pattern: Vec<u8>) -> bool {
    let text = small_alphabet(&text);
    let pattern = small_alphabet(&pattern);

    let mut tree = SuffixTree::new();
    tree.extend_all("s0", text.iter().copied());

    if pattern.is_empty() {
        // contains("") is a documented convention (always present), not a
        // substring claim about `text` — see `SuffixTree::contains`.
        return tree.contains(&pattern).present;
    }

    tree.contains(&pattern).present == contains_subslice(&text, &pattern)
}

#[quickcheck]
fn contains_finds_positions_in_whichever_sequence_holds_the_pattern(
    a: Vec<u8>,
    b: Vec<u8>,
    pattern: Vec<u8>,
) -> bool {
    let a = small_alphabet(&a);
    let b = small_alphabet(&b);
    let pattern = small_alphabet(&pattern);
    if pattern.is_empty() {
        return true;
    }

    let mut tree = SuffixTree::new();
    tree.extend_all("s0", a.iter().copied());
    tree.extend_all("s1", b.iter().copied());

    let occurrences = tree.contains(&pattern);
    let expected_present = contains_subslice(&a, &pattern) || contains_subslice(&b, &pattern);
    if occurrences.present != expected_present {
        return false;
    }

    let in_a = occurrences.positions.get("s0").map_or(0, Vec::len) > 0;
    let in_b = occurrences.positions.get("s1").map_or(0, Vec::len) > 0;
    in_a == contains_subslice(&a, &pattern) && in_b == contains_subslice(&b, &pattern)
}

#[quickcheck]
fn repeated_query_is_idempotent(text: Vec<u8>, pattern: Vec<u8>) -> bool {
    let text = small_alphabet(&text);
    let pattern = small_alphabet(&pattern);

    let mut tree = SuffixTree::new();
    tree.extend_all("s0", text);

    tree.contains(&pattern) == tree.contains(&pattern)
}

#[quickcheck]
fn interleaving_order_across_disjoint_sequences_does_not_affect_query_results(
    a: Vec<u8>,
    b: Vec<u8>,
    pattern: Vec<u8>,
) -> bool {
    let a = small_alphabet(&a);
    let b = small_alphabet(&b);
    let pattern = small_alphabet(&pattern);

    let mut sequential = SuffixTree::new();
    sequential.extend_all("s0", a.iter().copied());
    sequential.extend_all("s1", b.iter().copied());

    let mut interleaved = SuffixTree::new();
    let longest = a.len().max(b.len());
    for i in 0..longest {
        if i < a.len() {
            interleaved.extend("s0", a[i]);
        }
        if i < b.len() {
            interleaved.extend("s1", b[i]);
        }
    }

    sequential.contains(&pattern) == interleaved.contains(&pattern)
}
