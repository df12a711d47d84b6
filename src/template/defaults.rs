//! Built-in templates and keyword tables for fallback template selection.

/// Branch-name keywords, checked in order by substring.
pub const BRANCH_KEYWORDS: &[(&str, &[&str])] = &[
    ("hotfix", &["hotfix"]),
    ("release", &["release"]),
    ("feature", &["feature", "feat"]),
    ("bugfix", &["bugfix", "bug", "fix"]),
];

/// Commit-message keywords, checked in order by prefix of the lowercased message.
pub const COMMIT_KEYWORDS: &[(&str, &[&str])] = &[
    ("hotfix", &["hotfix"]),
    ("feature", &["feat", "feature"]),
    ("bugfix", &["fix"]),
    ("release", &["release"]),
];

const FEATURE: &str = "## 🎯 What does this PR do?

<!-- AI will fill this automatically -->

## 🔄 Changes Made

<!-- AI will fill this automatically -->

## 🧪 Testing

- [ ] Tests added/updated
- [ ] Manual testing completed

## 📝 Review Notes

<!-- AI will fill this automatically -->";

const HOTFIX: &str = "## 🚨 What's the issue?

<!-- AI will fill this automatically -->

## 🔧 How is it fixed?

<!-- AI will fill this automatically -->

## ⏰ Urgency Level

- [ ] Critical production issue
- [ ] Affects user experience
- [ ] Security vulnerability
- [ ] Minor issue

## 🧪 How to verify the fix

<!-- AI will fill this automatically -->

## 🔗 Related Issues

- Fixes #";

const BUGFIX: &str = "## 🐛 Bug Description

<!-- AI will fill this automatically -->

## 🔧 Fix Applied

<!-- AI will fill this automatically -->

## ✅ Testing

- [ ] Bug reproduction confirmed
- [ ] Fix tested locally
- [ ] Regression tests added

## 📝 Review Notes

<!-- AI will fill this automatically -->";

const RELEASE: &str = "## 🚀 Release Summary

<!-- AI will fill this automatically -->

## 📋 Changes in this Release

<!-- AI will fill this automatically -->

## 🧪 Testing Checklist

- [ ] All tests pass
- [ ] Manual QA completed
- [ ] Performance verified

## 📝 Release Notes

<!-- AI will fill this automatically -->";

const GENERIC: &str = "## Summary

<!-- AI will fill this automatically -->

## Changes

<!-- AI will fill this automatically -->

## Testing

<!-- AI will fill this automatically -->

## Review Notes

<!-- AI will fill this automatically -->";

/// Built-in template for `identifier`, if one exists.
pub fn builtin_template(identifier: &str) -> Option<&'static str> {
    match identifier {
        "feature" => Some(FEATURE),
        "hotfix" => Some(HOTFIX),
        "bugfix" => Some(BUGFIX),
        "release" => Some(RELEASE),
        "default" => Some(GENERIC),
        _ => None,
    }
}

/// Built-in template for `identifier`, or the generic one.
pub fn builtin_or_generic(identifier: &str) -> &'static str {
    builtin_template(identifier).unwrap_or(GENERIC)
}
