//! HTML rendering for the todo page

use crate::service::TodoPage;

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Render the full index page for `page`.
///
/// Each todo is an `<li class="todo">` whose `data-item` attribute carries the
/// exact text used by its delete button.
pub fn index_page(page: &TodoPage) -> String {
    let mut items = String::new();
    for todo in &page.todos {
        let escaped = escape_html(todo);
        items.push_str(&format!(
            "      <li class=\"todo\" data-item=\"{0}\"><span>{0}</span> \
             <button type=\"button\" onclick=\"deleteTodo(this.parentElement)\">Delete</button></li>\n",
            escaped
        ));
    }

    let banner = if page.enterprise {
        "    <p class=\"banner\">Enterprise edition</p>\n"
    } else {
        ""
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <title>Todo List</title>
  </head>
  <body>
{banner}    <h1>Todo List</h1>
    <form method="post" action="/">
      <input type="text" name="Item" placeholder="What needs doing?" autofocus>
      <button type="submit">Add</button>
    </form>
    <ul class="todos">
{items}    </ul>
    <footer>Version: {version}</footer>
    <script>
      function deleteTodo(li) {{
        fetch("/delete?item=" + encodeURIComponent(li.dataset.item), {{ method: "DELETE" }})
          .then(function () {{ li.remove(); }});
      }}
    </script>
  </body>
</html>
"#,
        banner = banner,
        items = items,
        version = escape_html(&page.version),
    )
}
